use std::fmt;

use crate::alloc::AllocStats;
use crate::suite::BenchRecord;

/// Human-readable byte count: `512 B`, `32.0 KiB`, `8.0 MiB`.
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{} B", bytes)
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

fn format_allocs(allocs: Option<AllocStats>) -> String {
    match allocs {
        Some(s) => format!("{} allocs, {}", s.allocs, format_bytes(s.bytes)),
        None => "allocs n/a".to_string(),
    }
}

/// Tabular view over a run's records.
///
/// One block per size with time, throughput, speedup and heap
/// allocations per kernel, followed by a summary with the average speedup
/// of each kernel.
pub struct Report<'a> {
    records: &'a [BenchRecord],
}

impl<'a> Report<'a> {
    pub fn new(records: &'a [BenchRecord]) -> Self {
        Report { records }
    }

    /// Sizes in first-seen order.
    fn sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        for r in self.records {
            if !sizes.contains(&r.size) {
                sizes.push(r.size);
            }
        }
        sizes
    }

    /// Kernel names in first-seen order.
    fn kernels(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for r in self.records {
            if !names.contains(&r.kernel.as_str()) {
                names.push(&r.kernel);
            }
        }
        names
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes = self.sizes();

        for &size in &sizes {
            let block: Vec<&BenchRecord> =
                self.records.iter().filter(|r| r.size == size).collect();
            write!(f, "Matrix: {}x{}", size, size)?;
            if let Some(first) = block.first() {
                let operand = (size * size * first.dtype.size_in_bytes()) as u64;
                write!(f, " {} ({} per operand)", first.dtype, format_bytes(operand))?;
            }
            writeln!(f)?;
            writeln!(f, "{}", "-".repeat(72))?;
            for (i, r) in block.iter().enumerate() {
                writeln!(
                    f,
                    "{}. {:12} {:10.3} ms  {:8.2} GFLOPS  ({:.1}x)  {}",
                    i + 1,
                    r.kernel,
                    r.timing.mean_ms(),
                    r.gflops,
                    r.speedup,
                    format_allocs(r.allocs)
                )?;
            }
            writeln!(f)?;
        }

        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "SUMMARY")?;
        writeln!(f, "{}", "=".repeat(60))?;
        write!(f, "{:<12}", "Kernel")?;
        for &size in &sizes {
            write!(f, " {:>12}", format!("{}x{}", size, size))?;
        }
        writeln!(f, " {:>10}", "Speedup")?;

        for name in self.kernels() {
            let rows: Vec<&BenchRecord> =
                self.records.iter().filter(|r| r.kernel == name).collect();
            write!(f, "{:<12}", name)?;
            for &size in &sizes {
                match rows.iter().find(|r| r.size == size) {
                    Some(r) => write!(f, " {:>9.2} GF", r.gflops)?,
                    None => write!(f, " {:>12}", "-")?,
                }
            }
            let avg = rows.iter().map(|r| r.speedup).sum::<f64>() / rows.len() as f64;
            writeln!(f, " {:>9.1}x", avg)?;
        }

        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "GF = GFLOPS. Speedup relative to the first kernel.")
    }
}

/// Render a run's records as a plain-text table.
pub fn render_table(records: &[BenchRecord]) -> String {
    Report::new(records).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::Timing;
    use mp_matrix::DType;
    use std::time::Duration;

    fn record(kernel: &str, size: usize, ms: u64, speedup: f64) -> BenchRecord {
        BenchRecord {
            kernel: kernel.to_string(),
            size,
            dtype: DType::F64,
            timing: Timing::from_samples(vec![Duration::from_millis(ms)]),
            allocs: None,
            gflops: 1.5,
            speedup,
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(32 * 1024), "32.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 / 2), "1.5 MiB");
    }

    #[test]
    fn test_render_allocs_and_operand_size() {
        let mut naive = record("naive", 64, 10, 1.0);
        naive.allocs = Some(AllocStats {
            allocs: 12_288,
            bytes: 4 * 1024 * 1024,
        });
        let mut local = record("local-sum", 64, 5, 2.0);
        local.allocs = Some(AllocStats::default());
        let out = render_table(&[naive, local]);

        assert!(out.contains("Matrix: 64x64 f64 (32.0 KiB per operand)"));
        assert!(out.contains("12288 allocs, 4.0 MiB"));
        assert!(out.contains("0 allocs, 0 B"));
    }

    #[test]
    fn test_render_table() {
        let records = vec![
            record("naive", 64, 10, 1.0),
            record("local-sum", 64, 5, 2.0),
            record("naive", 128, 80, 1.0),
            record("local-sum", 128, 20, 4.0),
        ];
        let out = render_table(&records);

        assert!(out.contains("Matrix: 64x64"));
        assert!(out.contains("Matrix: 128x128"));
        assert!(out.contains("1. naive"));
        assert!(out.contains("2. local-sum"));
        assert!(out.contains("(4.0x)"));
        assert!(out.contains("SUMMARY"));
        assert!(out.contains("allocs n/a"));

        let summary_line = out
            .lines()
            .find(|l| l.starts_with("local-sum"))
            .unwrap();
        assert!(summary_line.trim_end().ends_with("3.0x"));
    }

    #[test]
    fn test_render_empty() {
        let out = render_table(&[]);
        assert!(out.contains("SUMMARY"));
        assert!(!out.contains("Matrix:"));
    }
}
