//! Differential testing of the multiset engines against the reference.
//!
//! A [`WorkloadGenerator`] produces a [`Workload`], and a
//! [`DifferentialRunner`] feeds it to the [reference][crate::unsync] and to the
//! [concurrent engines][crate::sync], then compares their result vectors. The
//! [`artifact`] module reads and writes the files a divergence leaves behind.

pub mod artifact;
mod builder;
mod generator;
mod runner;
mod stress;
mod workload;

pub use {
    builder::RunnerBuilder,
    generator::{GeneratorConfig, WorkloadGenerator},
    runner::{DifferentialRunner, EngineRun, RunReport},
    stress::{stress, StressConfig},
    workload::Workload,
};
