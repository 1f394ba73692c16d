// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering for `wq-admin`'s subcommands: plain text by default, or JSON
//! (`--json`) for scripting. Not the "JSON command dispatcher" spec.md §1
//! lists as out of scope — that's a request/response protocol for driving
//! the daemon; this is just an alternate serialization of this binary's own
//! direct output.

use wq_core::Job;
use wq_engine::admin::{BenchResult, Stats};

pub fn print_stats(stats: &Stats, json: bool) {
    if json {
        print_json(stats);
        return;
    }
    println!("live workers: {}", stats.live_workers);
    println!("completed: {}", stats.completed_length);
    println!("dead letter: {}", stats.dead_letter_length);
    let mut priorities: Vec<_> = stats.ready_lengths.keys().collect();
    priorities.sort();
    for priority in priorities {
        println!("ready[{priority}]: {}", stats.ready_lengths[priority]);
    }
}

pub fn print_jobs(jobs: &[Job], json: bool) {
    if json {
        print_json(jobs);
        return;
    }
    if jobs.is_empty() {
        println!("(empty)");
        return;
    }
    for job in jobs {
        println!("{} attempts={} priority={} {}", job.id, job.attempts, job.priority, job.file_path);
    }
}

pub fn print_bench(result: &BenchResult, json: bool) {
    if json {
        print_json(result);
        return;
    }
    println!("elapsed: {:.2}s", result.elapsed.as_secs_f64());
    println!("throughput: {:.1} jobs/sec", result.throughput_per_sec);
    println!("success: {}", result.success);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => eprintln!("failed to render JSON: {err}"),
    }
}
