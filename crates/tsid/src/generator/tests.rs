use crate::{
    ByteRandom, ConfigurationError, Error, RandSource, TimeSource, TsidGenerator,
    generator::CLOCK_DRIFT_TOLERANCE,
};
use core::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Mutex;
use std::thread::scope;
use std::time::Duration;

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

impl SharedMockStepTime {
    fn new(values: Vec<u64>) -> Self {
        Self {
            clock: Rc::new(MockStepTime {
                values,
                index: Cell::new(0),
            }),
        }
    }

    fn step(&self) {
        self.clock.index.set(self.clock.index.get() + 1);
    }
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

struct FixedRand {
    rand: u64,
}

impl RandSource for FixedRand {
    fn rand(&self) -> u64 {
        self.rand
    }
}

#[test]
fn same_millisecond_increments_counter() {
    let generator = TsidGenerator::builder()
        .node_bits(0)
        .epoch(Duration::ZERO)
        .clock(MockTime { millis: 42 })
        .random(FixedRand { rand: 7 })
        .build()
        .unwrap();

    let id1 = generator.try_create().unwrap();
    let id2 = generator.try_create().unwrap();
    let id3 = generator.try_create().unwrap();

    assert_eq!(id1.time(), 42);
    assert_eq!(id2.time(), 42);
    assert_eq!(id3.time(), 42);
    assert_eq!(id1.random(), 7);
    assert_eq!(id2.random(), 8);
    assert_eq!(id3.random(), 9);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn new_millisecond_redraws_counter() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let generator = TsidGenerator::builder()
        .node_bits(0)
        .epoch(Duration::ZERO)
        .clock(shared_time.clone())
        .random(FixedRand { rand: 5 })
        .build()
        .unwrap();

    let id1 = generator.try_create().unwrap();
    let id2 = generator.try_create().unwrap();
    assert_eq!(id1.random(), 5);
    assert_eq!(id2.random(), 6);

    shared_time.step();

    let id3 = generator.try_create().unwrap();
    assert_eq!(id3.time(), 43);
    assert_eq!(id3.random(), 5);
    assert!(id2 < id3);
}

#[test]
fn backward_step_within_tolerance_keeps_incrementing() {
    let shared_time = SharedMockStepTime::new(vec![100_000, 95_000]);
    let generator = TsidGenerator::builder()
        .node_bits(0)
        .epoch(Duration::ZERO)
        .clock(shared_time.clone())
        .random(FixedRand { rand: 5 })
        .build()
        .unwrap();

    let id1 = generator.try_create().unwrap();
    shared_time.step();
    let id2 = generator.try_create().unwrap();

    // The 5s step back stays within the window, so the time field holds and
    // the counter advances.
    assert_eq!(id2.time(), 100_000);
    assert_eq!(id2.random(), 6);
    assert!(id1 < id2);
}

#[test]
fn regression_past_tolerance_accepts_new_time() {
    let shared_time = SharedMockStepTime::new(vec![100_000, 100_000 - CLOCK_DRIFT_TOLERANCE]);
    let generator = TsidGenerator::builder()
        .node_bits(0)
        .epoch(Duration::ZERO)
        .clock(shared_time.clone())
        .random(FixedRand { rand: 5 })
        .build()
        .unwrap();

    let id1 = generator.try_create().unwrap();
    shared_time.step();
    let id2 = generator.try_create().unwrap();

    assert_eq!(id2.time(), 90_000);
    assert_eq!(id2.random(), 5);
    assert!(id2 < id1);
}

#[test]
fn counter_overflow_borrows_next_millisecond() {
    // 20 node bits leave a 2-bit counter: 4 ids per millisecond.
    let generator = TsidGenerator::builder()
        .node(0)
        .node_bits(20)
        .epoch(Duration::ZERO)
        .clock(MockTime { millis: 42 })
        .random(FixedRand { rand: 0 })
        .build()
        .unwrap();

    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(generator.try_create().unwrap());
    }

    for (i, id) in ids.iter().take(4).enumerate() {
        assert_eq!(id.time(), 42);
        assert_eq!(id.random(), i as u64);
    }

    // The fifth call exhausts the counter and borrows millisecond 43.
    assert_eq!(ids[4].time(), 43);
    assert_eq!(ids[4].random(), 0);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn full_capacity_within_one_millisecond_is_unique() {
    // 12 node bits leave a 10-bit counter: 1024 ids per millisecond.
    let generator = TsidGenerator::builder()
        .node(1)
        .node_bits(12)
        .epoch(Duration::ZERO)
        .clock(MockTime { millis: 7 })
        .random(FixedRand { rand: 0 })
        .build()
        .unwrap();

    let mut seen = HashSet::new();
    let mut previous = None;
    for _ in 0..1024 {
        let id = generator.try_create().unwrap();
        assert_eq!(id.time(), 7);
        assert_eq!(id.random() >> 10, 1); // node field
        assert!(seen.insert(id));
        if let Some(prev) = previous {
            assert!(prev < id);
        }
        previous = Some(id);
    }

    // One past capacity: carried forward into the borrowed millisecond.
    let id = generator.try_create().unwrap();
    assert_eq!(id.time(), 8);
    assert!(seen.insert(id));
    assert!(previous.unwrap() < id);
}

#[test]
fn strictly_monotonic_across_jittery_clock() {
    let shared_time = SharedMockStepTime::new(vec![50, 51, 51, 49, 60, 55, 70]);
    let generator = TsidGenerator::builder()
        .node_bits(0)
        .epoch(Duration::ZERO)
        .clock(shared_time.clone())
        .random(FixedRand { rand: 0 })
        .build()
        .unwrap();

    let mut previous = generator.try_create().unwrap();
    for _ in 1..7 {
        shared_time.step();
        let id = generator.try_create().unwrap();
        assert!(previous < id, "{previous:?} not below {id:?}");
        previous = id;
    }
}

#[test]
fn concurrent_generation_is_unique() {
    const THREADS: usize = 8;
    const IDS_PER_THREAD: usize = 4096;

    let generator = TsidGenerator::new_1024(1);
    let seen_ids = Mutex::new(HashSet::with_capacity(THREADS * IDS_PER_THREAD));

    scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.try_create().unwrap();
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, THREADS * IDS_PER_THREAD);
}

#[test]
fn clock_before_epoch_saturates_to_zero() {
    let generator = TsidGenerator::builder()
        .node_bits(0)
        .epoch(Duration::from_millis(10_000))
        .clock(MockTime { millis: 5_000 })
        .random(FixedRand { rand: 3 })
        .build()
        .unwrap();

    let id = generator.try_create().unwrap();
    assert_eq!(id.time(), 0);
}

#[test]
fn node_bits_out_of_range_is_a_build_error() {
    let result = TsidGenerator::builder().node_bits(21).build();
    assert_eq!(
        result.err(),
        Some(Error::Configuration(
            ConfigurationError::NodeBitsOutOfRange { bits: 21 }
        ))
    );
}

#[test]
fn node_bits_bounds_are_accepted() {
    let generator = TsidGenerator::builder().node_bits(0).build().unwrap();
    assert_eq!(generator.counter_bits(), 22);

    let generator = TsidGenerator::builder().node_bits(20).build().unwrap();
    assert_eq!(generator.counter_bits(), 2);

    let generator = TsidGenerator::builder().build().unwrap();
    assert_eq!(generator.node_bits(), 10);
    assert_eq!(generator.counter_bits(), 12);
}

#[test]
fn explicit_node_takes_precedence_over_source() {
    let generator = TsidGenerator::builder()
        .node(5)
        .node_source(|| Some(9u64))
        .build()
        .unwrap();
    assert_eq!(generator.node(), 5);
}

#[test]
fn node_source_is_used_when_no_explicit_node() {
    let generator = TsidGenerator::builder()
        .node_source(|| Some(9u64))
        .build()
        .unwrap();
    assert_eq!(generator.node(), 9);
}

#[test]
fn node_falls_back_to_a_random_draw() {
    let generator = TsidGenerator::builder()
        .node_source(|| None::<u64>)
        .random(FixedRand { rand: 0x155 })
        .build()
        .unwrap();
    assert_eq!(generator.node(), 0x155);
}

#[test]
fn node_is_masked_to_the_configured_width() {
    let generator = TsidGenerator::builder()
        .node(0x7FF)
        .node_bits(8)
        .build()
        .unwrap();
    assert_eq!(generator.node(), 0xFF);
}

#[test]
fn node_is_embedded_in_the_random_component() {
    let generator = TsidGenerator::builder()
        .node(3)
        .node_bits(10)
        .epoch(Duration::ZERO)
        .clock(MockTime { millis: 42 })
        .random(FixedRand { rand: 0 })
        .build()
        .unwrap();

    let id = generator.try_create().unwrap();
    assert_eq!(id.random() >> 12, 3);
    assert_eq!(id.random() & 0xFFF, 0);
}

#[test]
fn custom_epoch_offsets_the_time_field() {
    let generator = TsidGenerator::builder()
        .node_bits(0)
        .epoch(Duration::from_millis(1_000))
        .clock(MockTime { millis: 1_500 })
        .random(FixedRand { rand: 0 })
        .build()
        .unwrap();

    let id = generator.try_create().unwrap();
    assert_eq!(id.time(), 500);
    assert_eq!(id.unix_millis_with_epoch(Duration::from_millis(1_000)), 1_500);
}

#[test]
fn empty_byte_random_resets_counter_to_zero() {
    let generator = TsidGenerator::builder()
        .node_bits(0)
        .epoch(Duration::ZERO)
        .clock(MockTime { millis: 42 })
        .random(ByteRandom::new(|_| Vec::new()))
        .build()
        .unwrap();

    let id1 = generator.try_create().unwrap();
    let id2 = generator.try_create().unwrap();
    assert_eq!(id1.random(), 0);
    assert_eq!(id2.random(), 1);
}

#[test]
fn presets_pick_the_documented_split() {
    let generator = TsidGenerator::new_256(1);
    assert_eq!(generator.node_bits(), 8);
    assert_eq!(generator.counter_bits(), 14);

    let generator = TsidGenerator::new_1024(1);
    assert_eq!(generator.node_bits(), 10);
    assert_eq!(generator.counter_bits(), 12);

    let generator = TsidGenerator::new_4096(1);
    assert_eq!(generator.node_bits(), 12);
    assert_eq!(generator.counter_bits(), 10);

    let id = generator.try_create().unwrap();
    assert_eq!(id.random() >> 10, 1);
}
