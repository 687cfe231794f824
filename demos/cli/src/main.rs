use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use triage_core::{QueueSummary, TriageConfig};
use triage_intake::{intake_form_str, order_queue_str, parse_queue_str, prioritize_queue_str};

#[derive(Parser, Debug)]
#[command(
    name = "triage-cli",
    about = "Phân loại SATS và sắp xếp hàng đợi từ file JSON."
)]
struct Args {
    /// Bật log chi tiết (tương đương RUST_LOG=debug).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Phân loại một form triage.
    Classify {
        /// Đường dẫn tới file JSON form.
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Sắp xếp hàng đợi theo mức độ rồi giờ đến.
    Order {
        /// Đường dẫn tới file JSON danh sách bệnh nhân chờ.
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Nâng bệnh nhân nguy kịch lên RED rồi sắp lại hàng đợi của khoa.
    Prioritize {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        department: String,
        /// Mã bệnh nhân cần nâng mức (có thể lặp lại).
        #[arg(short, long)]
        critical: Vec<String>,
    },
    /// Tổng hợp hàng đợi cho bảng điều khiển.
    Summary {
        #[arg(short, long)]
        input: PathBuf,
        /// File JSON cấu hình thời gian chờ mục tiêu.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Thời điểm tính (RFC 3339), mặc định là hiện tại.
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Classify { .. } => "classify",
            Command::Order { .. } => "order",
            Command::Prioritize { .. } => "prioritize",
            Command::Summary { .. } => "summary",
        }
    }

    fn input(&self) -> &Path {
        match self {
            Command::Classify { input }
            | Command::Order { input }
            | Command::Prioritize { input, .. }
            | Command::Summary { input, .. } => input.as_path(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    info!(
        command = args.command.name(),
        input = %args.command.input().display(),
        "running triage command"
    );

    let output = match args.command {
        Command::Classify { input } => {
            let outcome = intake_form_str(&read_input(&input)?)?;
            serde_json::to_string_pretty(&outcome)?
        }
        Command::Order { input } => {
            let ordered = order_queue_str(&read_input(&input)?)?;
            serde_json::to_string_pretty(&ordered)?
        }
        Command::Prioritize {
            input,
            department,
            critical,
        } => {
            let ordered = prioritize_queue_str(&read_input(&input)?, &department, &critical)?;
            serde_json::to_string_pretty(&ordered)?
        }
        Command::Summary { input, config, now } => {
            let entries = parse_queue_str(&read_input(&input)?)?;
            let config = load_config(config.as_deref())?;
            let now = now.unwrap_or_else(Utc::now);
            let summary = QueueSummary::from_entries(&entries, now, &config);
            serde_json::to_string_pretty(&summary)?
        }
    };

    println!("{output}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Không đọc được file {path:?}"))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TriageConfig> {
    let Some(path) = path else {
        return Ok(TriageConfig::default());
    };
    let data = read_input(path)?;
    serde_json::from_str(&data).with_context(|| format!("Config không hợp lệ: {path:?}"))
}
