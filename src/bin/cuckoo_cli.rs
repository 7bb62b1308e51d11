//! 交互式命令行前端: s=插入, g=查询, d=删除, x=退出

use clap::Parser;
use cuckoo_filter::{log_error, CuckooFilter, FilterConfig, DEFAULT_BUCKET_SIZE};
use env_logger::{Builder, Env};
use std::io::{self, BufRead, Write};

#[derive(Parser, Debug)]
#[command(name = "cuckoo-cli")]
#[command(about = "Interactive cuckoo filter shell", long_about = None)]
struct Cli {
    /// Expected number of items
    #[arg(long, default_value_t = 10)]
    items: usize,

    /// Target false-positive rate, in (0, 1)
    #[arg(long, default_value_t = 0.1)]
    accuracy: f64,

    /// Slots per bucket (1, 2, 4 or 8)
    #[arg(long, default_value_t = DEFAULT_BUCKET_SIZE)]
    bucket_size: usize,

    /// Seed for the eviction RNG
    #[arg(long)]
    seed: Option<u64>,
}

// 初始化日志记录器
fn init_logger() {
    let env = Env::default()
        .filter_or("RUST_LOG", "warn")
        .write_style_or("RUST_LOG_STYLE", "auto");

    Builder::from_env(env)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

/// 打印提示并读取一行，EOF 时返回 None
fn prompt(input: &mut impl BufRead, text: &str) -> io::Result<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let cli = Cli::parse();

    let config = FilterConfig {
        seed: cli.seed,
        ..FilterConfig::new(cli.items, cli.accuracy, cli.bucket_size)?
    };
    let filter = CuckooFilter::with_config(config)?;
    println!(
        "buckets={} bucket_size={} fingerprint_bits={} max_retries={}",
        filter.bucket_count(),
        filter.bucket_size(),
        filter.fingerprint_bits(),
        filter.max_retries()
    );

    let stdin = io::stdin();
    let mut input = stdin.lock();
    while let Some(cmd) = prompt(&mut input, "[s=set, g=get, d=delete, x=exit]: ")? {
        if cmd == "x" {
            break;
        }
        if !matches!(cmd.as_str(), "s" | "g" | "d") {
            continue;
        }
        let Some(item) = prompt(&mut input, "Enter string: ")? else {
            break;
        };
        match cmd.as_str() {
            "s" => {
                if let Err(e) = filter.insert(&item) {
                    log_error!("insert {} failed: {}", item, e);
                    println!("{e}");
                }
            }
            "g" => {
                if filter.lookup(&item) {
                    println!("Probably in set.");
                } else {
                    println!("Definitely not in set.");
                }
            }
            _ => {
                filter.delete(&item);
                println!("Deleted {item} from filter.");
            }
        }
    }
    Ok(())
}
