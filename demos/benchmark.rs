#[macro_use]
extern crate log;
extern crate env_logger;
extern crate getopts;
extern crate hotstat;

use getopts::Options;
use hotstat::{Configuration, Recorder, Statistics, Statser};
use std::{
    env,
    sync::{
        atomic::{AtomicBool, AtomicI64, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

struct Generator {
    stats: Arc<Statistics<Arc<Recorder>>>,
    keys: Vec<String>,
    requested: Arc<AtomicI64>,
    done: Arc<AtomicBool>,
}

impl Generator {
    fn new(
        stats: Arc<Statistics<Arc<Recorder>>>, keys: Vec<String>, requested: Arc<AtomicI64>, done: Arc<AtomicBool>,
    ) -> Generator {
        Generator {
            stats,
            keys,
            requested,
            done,
        }
    }

    fn run(&self) {
        let mut n = 0;
        while !self.done.load(Ordering::Relaxed) {
            let key = &self.keys[n % self.keys.len()];
            let amount = (n % 7) as i64 + 1;
            // A failed threshold flush still counts the increment.
            let _ = self.stats.buffered_increment_by(key, amount);
            self.requested.fetch_add(amount, Ordering::Relaxed);
            n += 1;
        }
    }
}

fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

pub fn opts() -> Options {
    let mut opts = Options::new();

    opts.optopt("p", "producers", "number of producers", "INTEGER");
    opts.optopt("k", "keys", "number of distinct counter keys", "INTEGER");
    opts.optopt("i", "interval", "flush interval in milliseconds", "INTEGER");
    opts.optopt("d", "duration", "seconds to run for", "INTEGER");
    opts.optflag("h", "help", "print this help menu");

    opts
}

fn parse_opt(matches: &getopts::Matches, name: &str, default: u64) -> Option<u64> {
    match matches.opt_str(name) {
        None => Some(default),
        Some(raw) => match raw.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                error!("invalid value for --{}: {}", name, e);
                None
            },
        },
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = &args[0];
    let opts = opts();

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            error!("Failed to parse command line args: {}", f);
            return;
        },
    };

    if matches.opt_present("help") {
        print_usage(program, &opts);
        return;
    }

    info!("hotstat benchmark");

    let (producers, keys, interval, duration) = match (
        parse_opt(&matches, "producers", 4),
        parse_opt(&matches, "keys", 16),
        parse_opt(&matches, "interval", 100),
        parse_opt(&matches, "duration", 5),
    ) {
        (Some(p), Some(k), Some(i), Some(d)) => (p as usize, k.max(1) as usize, i, d),
        _ => return,
    };

    info!("producers: {}", producers);
    info!("keys: {}", keys);
    info!("flush interval: {}ms", interval);

    let recorder = Arc::new(Recorder::new());
    let stats = match Configuration::new()
        .flush_interval(Duration::from_millis(interval))
        .build_with_transport(recorder.clone())
    {
        Ok(stats) => Arc::new(stats),
        Err(e) => {
            error!("failed to build statistics: {}", e);
            return;
        },
    };

    let key_names = (0..keys).map(|i| format!("bench.key{}", i)).collect::<Vec<_>>();
    let requested = Arc::new(AtomicI64::new(0));
    let done = Arc::new(AtomicBool::new(false));

    // Spin up our increment producers.
    let handles = (0..producers)
        .map(|_| {
            let generator = Generator::new(stats.clone(), key_names.clone(), requested.clone(), done.clone());
            thread::spawn(move || generator.run())
        })
        .collect::<Vec<_>>();

    let t0 = Instant::now();
    let mut last = 0;
    for _ in 0..duration {
        thread::sleep(Duration::from_secs(1));
        let total = requested.load(Ordering::Relaxed);
        info!("rate: {} increments per second, {} emissions so far", total - last, recorder.len());
        last = total;
    }

    done.store(true, Ordering::Relaxed);
    for handle in handles {
        let _ = handle.join();
    }

    if let Err(e) = stats.flush() {
        error!("final flush failed: {}", e);
    }

    let elapsed = t0.elapsed();
    let requested = requested.load(Ordering::Relaxed);
    let emitted: i64 = key_names.iter().map(|k| recorder.count_total(k)).sum();
    let emissions = recorder.len();

    info!("elapsed: {:?}", elapsed);
    info!("total requested: {}", requested);
    info!("total emitted: {} across {} emissions", emitted, emissions);
    if requested == emitted {
        info!("emitted totals match requested totals");
    } else {
        error!("mismatch: requested {} but emitted {}", requested, emitted);
    }
}
