use clap::Args;

#[derive(Args)]
pub struct ScanArgs {
    /// CPU percentage that marks a process as an offender
    /// (defaults to the configured threshold)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub threshold: Option<u8>,
}

/// Runs one attribution scan in the foreground and prints the offenders.
pub fn execute(args: &ScanArgs) {
    if let Err(e) = platform::scan(args.threshold) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(windows)]
mod platform {
    use std::sync::Arc;

    use comfy_table::presets::UTF8_FULL;
    use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
    use ringmon_core::format::{to_file_size, to_time_string};
    use ringmon_core::{
        AttributionRecord, AttributionScanner, Context, FileLog, LogSink, WindowResult, settings,
    };
    use ringmon_windows::WinProcessSampler;

    pub fn scan(threshold: Option<u8>) -> WindowResult<()> {
        let (loaded, load_error) = settings::load();
        if let Some(e) = load_error {
            eprintln!("Warning: {e}; using default settings.");
        }

        let threshold = threshold.unwrap_or(loaded.cpu_threshold);
        if threshold == 0 {
            println!("Attribution scans are disabled (cpu_threshold = 0).");
            return Ok(());
        }

        let log: Arc<dyn LogSink> = Arc::new(FileLog::new(&loaded.logging));
        let scanner = AttributionScanner::new(
            Arc::new(WinProcessSampler::new()),
            Context::new(log),
            loaded.scan.clone(),
        );

        println!("Scanning processes at {threshold}% ...");
        let mut records: Vec<AttributionRecord> = Vec::new();
        let Some(summary) = scanner.run_exclusive(threshold, |r| records.push(r.clone())) else {
            return Err("another scan is already running".into());
        };

        records.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Process"),
                Cell::new("PID").set_alignment(CellAlignment::Right),
                Cell::new("CPU").set_alignment(CellAlignment::Right),
                Cell::new("Time").set_alignment(CellAlignment::Right),
                Cell::new("Memory").set_alignment(CellAlignment::Right),
                Cell::new("Threads").set_alignment(CellAlignment::Right),
                Cell::new("Title"),
            ]);

        for r in &records {
            table.add_row(vec![
                Cell::new(&r.name),
                Cell::new(r.pid).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.1}%", r.cpu_percent)).set_alignment(CellAlignment::Right),
                Cell::new(to_time_string(r.total_cpu_time)).set_alignment(CellAlignment::Right),
                Cell::new(to_file_size(r.working_set)).set_alignment(CellAlignment::Right),
                Cell::new(r.thread_count).set_alignment(CellAlignment::Right),
                Cell::new(r.window_title.as_deref().unwrap_or("")),
            ]);
        }

        println!("{table}");
        println!(
            "\n{} offenders, {} examined, {} skipped (under {} s of CPU), {} errors",
            summary.offenders,
            summary.examined,
            summary.skipped,
            loaded.scan.min_cpu_time_secs,
            summary.errors
        );
        Ok(())
    }
}

#[cfg(not(windows))]
mod platform {
    use ringmon_core::WindowResult;

    pub fn scan(_threshold: Option<u8>) -> WindowResult<()> {
        Err("attribution scans are only available on Windows".into())
    }
}
