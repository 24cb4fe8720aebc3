//! Identifier generation
//!
//! Generated ids embed a millisecond timestamp. The timestamp comes from a
//! process-wide monotonic clock: when two ids are requested within the same
//! millisecond the second one is stamped one millisecond later, so ids of the
//! same kind never collide inside one process. Task group and metric ids also
//! carry a random base-36 suffix.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use rand::Rng;

use crate::constants::{
    EMPLOYEE_ID_PREFIX, ID_SUFFIX_LEN, METRIC_ID_PREFIX, PROJECT_ID_PREFIX, TASK_GROUP_ID_PREFIX,
};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Next strictly increasing millisecond stamp
fn next_stamp() -> i64 {
    let mut prev = LAST_STAMP.load(Ordering::SeqCst);
    loop {
        let candidate = Utc::now().timestamp_millis().max(prev + 1);
        match LAST_STAMP.compare_exchange(prev, candidate, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return candidate,
            Err(actual) => prev = actual,
        }
    }
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `project_<ms>`
pub fn project_id() -> String {
    format!("{}_{}", PROJECT_ID_PREFIX, next_stamp())
}

/// `taskgroup_<ms>_<suffix>`
pub fn task_group_id() -> String {
    format!("{}_{}_{}", TASK_GROUP_ID_PREFIX, next_stamp(), random_suffix())
}

/// `metric_<ms>_<suffix>`
pub fn metric_id() -> String {
    format!("{}_{}_{}", METRIC_ID_PREFIX, next_stamp(), random_suffix())
}

/// `emp_<ms>`
pub fn employee_id() -> String {
    format!("{}_{}", EMPLOYEE_ID_PREFIX, next_stamp())
}

/// Use the supplied id unless it is absent or blank
pub fn or_generate(id: Option<String>, generate: fn() -> String) -> String {
    match id {
        Some(id) if !id.trim().is_empty() => id,
        _ => generate(),
    }
}
