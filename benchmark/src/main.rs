use clap::Parser;
use color_eyre::Result;
use domain::cli::{CliEnvironment, SharedBroker, bootstrap};
use hdrhistogram::Histogram;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::info;

use broker_adapter::ChannelBroker;

#[derive(Parser, Debug)]
#[command(name = "cli-env-benchmark")]
#[command(about = "Contention benchmark for the layered environment registry")]
struct Args {
    /// Number of tasks reading the broker slot
    #[arg(short, long, default_value_t = 8)]
    readers: usize,

    /// Number of tasks replacing the broker
    #[arg(short, long, default_value_t = 2)]
    writers: usize,

    /// Duration of the test in seconds
    #[arg(short, long, default_value_t = 10)]
    duration: u64,

    /// Number of distinct brokers the writers rotate through
    #[arg(long, default_value_t = 4)]
    brokers: usize,

    /// Pause between two writes of the same writer, in microseconds
    #[arg(long, default_value_t = 0)]
    write_pause_us: u64,
}

#[derive(Debug)]
struct BenchmarkMetrics {
    pub reads: AtomicU64,
    pub writes: AtomicU64,
    pub empty_reads: AtomicU64,
    pub foreign_reads: AtomicU64,
    pub start_time: Instant,
}

impl BenchmarkMetrics {
    fn new() -> Self {
        Self {
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            empty_reads: AtomicU64::new(0),
            foreign_reads: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    fn get_throughput(&self, counter: &AtomicU64) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let count = counter.load(Ordering::Relaxed) as f64;
        if elapsed > 0.0 { count / elapsed } else { 0.0 }
    }

    fn print_report(&self, read_hist: &Histogram<u64>, write_hist: &Histogram<u64>) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let foreign = self.foreign_reads.load(Ordering::Relaxed);

        println!("\n=== ENVIRONMENT REGISTRY BENCHMARK RESULTS ===");
        println!("Test Duration: {:.2} seconds", elapsed);
        println!("Reads: {}", self.reads.load(Ordering::Relaxed));
        println!("Empty Reads: {}", self.empty_reads.load(Ordering::Relaxed));
        println!("Writes: {}", self.writes.load(Ordering::Relaxed));
        println!("Read Throughput: {:.0} ops/s", self.get_throughput(&self.reads));
        println!("Write Throughput: {:.0} ops/s", self.get_throughput(&self.writes));

        print_distribution("READ LATENCY", read_hist);
        print_distribution("WRITE LATENCY", write_hist);

        println!(
            "\nCONSISTENCY: {} (reads returning an unknown broker: {})",
            if foreign == 0 { "✓ PASS" } else { "✗ FAIL" },
            foreign
        );
    }
}

fn print_distribution(title: &str, hist: &Histogram<u64>) {
    println!("\n=== {title} ===");
    if hist.len() == 0 {
        println!("No samples");
        return;
    }
    println!("Min: {} ns", hist.min());
    println!("P50: {} ns", hist.value_at_quantile(0.50));
    println!("P90: {} ns", hist.value_at_quantile(0.90));
    println!("P99: {} ns", hist.value_at_quantile(0.99));
    println!("Max: {} ns", hist.max());
}

fn new_histogram() -> Result<Histogram<u64>> {
    Ok(Histogram::new_with_bounds(1, 1_000_000_000, 3)?)
}

fn reader_worker(
    env: Arc<CliEnvironment>,
    brokers: Arc<Vec<SharedBroker>>,
    metrics: Arc<BenchmarkMetrics>,
    should_stop: Arc<AtomicBool>,
) -> Result<Histogram<u64>> {
    let mut hist = new_histogram()?;
    while !should_stop.load(Ordering::Relaxed) {
        let started = Instant::now();
        let current = env.message_broker();
        hist.saturating_record(started.elapsed().as_nanos() as u64);
        metrics.reads.fetch_add(1, Ordering::Relaxed);

        match current {
            None => {
                metrics.empty_reads.fetch_add(1, Ordering::Relaxed);
            }
            Some(broker) => {
                if !brokers.iter().any(|known| Arc::ptr_eq(known, &broker)) {
                    metrics.foreign_reads.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
    Ok(hist)
}

fn writer_worker(
    env: Arc<CliEnvironment>,
    brokers: Arc<Vec<SharedBroker>>,
    metrics: Arc<BenchmarkMetrics>,
    should_stop: Arc<AtomicBool>,
    pause: Duration,
) -> Result<Histogram<u64>> {
    let mut rng = rand::thread_rng();
    let mut hist = new_histogram()?;
    while !should_stop.load(Ordering::Relaxed) {
        let broker = Arc::clone(&brokers[rng.gen_range(0..brokers.len())]);

        let started = Instant::now();
        env.set_message_broker(Some(broker))?;
        hist.saturating_record(started.elapsed().as_nanos() as u64);
        metrics.writes.fetch_add(1, Ordering::Relaxed);

        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    }
    Ok(hist)
}

async fn run_benchmark(args: Args) -> Result<()> {
    info!(
        "Starting registry benchmark with {} readers, {} writers for {}s",
        args.readers, args.writers, args.duration
    );

    let (_init, cli) = bootstrap();
    let env = Arc::new(cli);
    let brokers: Arc<Vec<SharedBroker>> = Arc::new(
        (0..args.brokers.max(1))
            .map(|_| Arc::new(ChannelBroker::new()) as SharedBroker)
            .collect(),
    );

    let metrics = Arc::new(BenchmarkMetrics::new());
    let should_stop = Arc::new(AtomicBool::new(false));
    let pause = Duration::from_micros(args.write_pause_us);

    let mut readers = Vec::new();
    for _ in 0..args.readers {
        let env = Arc::clone(&env);
        let brokers = Arc::clone(&brokers);
        let metrics = Arc::clone(&metrics);
        let should_stop = Arc::clone(&should_stop);
        readers.push(tokio::task::spawn_blocking(move || {
            reader_worker(env, brokers, metrics, should_stop)
        }));
    }

    let mut writers = Vec::new();
    for _ in 0..args.writers {
        let env = Arc::clone(&env);
        let brokers = Arc::clone(&brokers);
        let metrics = Arc::clone(&metrics);
        let should_stop = Arc::clone(&should_stop);
        writers.push(tokio::task::spawn_blocking(move || {
            writer_worker(env, brokers, metrics, should_stop, pause)
        }));
    }

    // Status reporting task
    let status_handle = {
        let metrics = Arc::clone(&metrics);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(5));
            loop {
                interval.tick().await;
                info!(
                    "Status: {} reads, {} writes, {:.0} reads/s",
                    metrics.reads.load(Ordering::Relaxed),
                    metrics.writes.load(Ordering::Relaxed),
                    metrics.get_throughput(&metrics.reads)
                );
            }
        })
    };

    sleep(Duration::from_secs(args.duration)).await;

    should_stop.store(true, Ordering::Relaxed);
    status_handle.abort();

    let mut read_hist = new_histogram()?;
    for handle in readers {
        read_hist.add(handle.await??)?;
    }
    let mut write_hist = new_histogram()?;
    for handle in writers {
        write_hist.add(handle.await??)?;
    }

    metrics.print_report(&read_hist, &write_hist);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("benchmark=info".parse()?),
        )
        .init();

    let args = Args::parse();

    info!("Environment Registry Benchmark");
    info!("Configuration: {:?}", args);

    run_benchmark(args).await?;

    Ok(())
}
