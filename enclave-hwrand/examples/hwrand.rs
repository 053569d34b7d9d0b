use {
    enclave_hwrand::{
        coarse_timestamp, cycle_counter_supported, get_random_u16, CycleReading, RandReader,
        RandomResult, DEFAULT_TSC_FREQ_HZ, RETRY_LIMIT,
    },
    std::io::Read,
    std::process,
};
use clap::Parser;

#[derive(Parser)]
enum Cli {
    /// Draw 16-bit values from the hardware generator
    Random {
        /// Query the hardware once instead of retrying
        #[arg(long)]
        no_retry: bool,
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Print random bytes as hex
    Bytes {
        #[arg(long, default_value_t = 32)]
        len: usize,
    },
    /// Sample the cycle counter
    Cycles {
        #[arg(long, default_value_t = 2)]
        samples: usize,
    },
    /// Print the cycle counter in coarse seconds
    Timestamp {
        #[arg(long, default_value_t = DEFAULT_TSC_FREQ_HZ)]
        freq: u64,
    },
}

fn random(retry: bool, count: usize) {
    let mut not_ready = 0;
    for _ in 0..count {
        match get_random_u16(retry) {
            RandomResult::Success(value) => println!("{:#06x}", value),
            RandomResult::NotReady => {
                not_ready += 1;
                println!("not ready");
            }
        }
    }
    if not_ready != 0 {
        eprintln!("{} of {} requests not ready (retry budget {})", not_ready, count, if retry { RETRY_LIMIT } else { 1 });
    }
}

fn bytes(len: usize) {
    let mut buf = vec![0u8; len];
    if let Err(e) = RandReader.read_exact(&mut buf) {
        eprintln!("Failed to read random bytes: {}", e);
        process::exit(1);
    }
    let hex: String = buf.iter().map(|b| format!("{:02x}", b)).collect();
    println!("{}", hex);
}

fn cycles(samples: usize) {
    if !cycle_counter_supported() {
        eprintln!("No cycle counter on this target, readings are always 0");
    }
    let first = CycleReading::now();
    let mut last = first;
    println!("{}", first);
    for _ in 1..samples {
        let now = CycleReading::now();
        println!("{} (+{})", now, now.cycles_since(&last));
        last = now;
    }
}

fn timestamp(freq: u64) {
    let secs = if freq == DEFAULT_TSC_FREQ_HZ {
        coarse_timestamp()
    } else {
        CycleReading::now().as_secs(freq)
    };
    match secs {
        Some(secs) => println!("{}", secs),
        None => {
            eprintln!("Cycle counter unavailable or frequency is zero");
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli {
        Cli::Random { no_retry, count } => random(!no_retry, count),
        Cli::Bytes { len } => bytes(len),
        Cli::Cycles { samples } => cycles(samples),
        Cli::Timestamp { freq } => timestamp(freq),
    }
}
