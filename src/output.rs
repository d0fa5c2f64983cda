use std::io::Write;

/// One row of the final report: an energy level with its population.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyGroup {
    pub energy: f64,
    pub count: usize,
    pub frequency: f64,
}

/// Energies closer than this collapse into one report row. Engine energies
/// are exact integers, so the tolerance only papers over float formatting of
/// identical values.
const GROUP_TOLERANCE: f64 = 1e-8;

/// Sort energies ascending and collapse near-equal values into groups with
/// relative frequencies.
pub fn group_energies(energies: &[f64]) -> Vec<EnergyGroup> {
    if energies.is_empty() {
        return Vec::new();
    }

    let mut sorted = energies.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let total = sorted.len() as f64;
    let mut groups: Vec<EnergyGroup> = Vec::new();
    for &e in &sorted {
        match groups.last_mut() {
            Some(g) if (e - g.energy).abs() <= GROUP_TOLERANCE => g.count += 1,
            _ => groups.push(EnergyGroup {
                energy: e,
                count: 1,
                frequency: 0.0,
            }),
        }
    }
    for g in &mut groups {
        g.frequency = g.count as f64 / total;
    }
    groups
}

/// Write the energy histogram, lowest level first.
///
/// With `lowest_only` set, only the best level found is reported; this is the
/// ground-state-search mode where the rest of the histogram is noise.
pub fn write_report(
    out: &mut impl Write,
    groups: &[EnergyGroup],
    source: &str,
    lowest_only: bool,
) -> std::io::Result<()> {
    let shown = if lowest_only && !groups.is_empty() {
        &groups[..1]
    } else {
        groups
    };
    for g in shown {
        writeln!(
            out,
            "{:>10}{:>10}{:>16.6}    {}",
            g.energy, g.count, g.frequency, source
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_sorts_and_counts() {
        let groups = group_energies(&[-2.0, 4.0, -2.0, -6.0, 4.0, 4.0, -6.0, -6.0]);
        let summary: Vec<(f64, usize)> = groups.iter().map(|g| (g.energy, g.count)).collect();
        assert_eq!(summary, vec![(-6.0, 3), (-2.0, 2), (4.0, 3)]);
        assert_eq!(groups[0].frequency, 3.0 / 8.0);
    }

    #[test]
    fn test_grouping_tolerates_float_noise() {
        let groups = group_energies(&[-4.0, -4.0 + 1e-12, -4.0 - 1e-12]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].frequency, 1.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_energies(&[]).is_empty());
    }

    #[test]
    fn test_report_layout() {
        let groups = group_energies(&[-4.0, -4.0, 0.0, 2.0]);
        let mut buf = Vec::new();
        write_report(&mut buf, &groups, "lat.txt", false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("-4"));
        assert!(lines[0].contains("0.500000"));
        assert!(lines[0].ends_with("lat.txt"));
    }

    #[test]
    fn test_lowest_only_keeps_first_row() {
        let groups = group_energies(&[-4.0, -4.0, 0.0, 2.0]);
        let mut buf = Vec::new();
        write_report(&mut buf, &groups, "lat.txt", true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("-4"));
    }
}
