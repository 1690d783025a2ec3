use super::constants::WORKER_THREAD_NAME_PREFIX;

use std::{io, panic, thread};

/// A bounded set of OS threads that executes one data-parallel phase at a time.
///
/// Threads are scoped to a single call: a call returns only after every worker
/// has finished, so consecutive calls are separated by a full barrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WorkerPool {
    num_workers: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(crate::common::available_parallelism())
    }
}

impl WorkerPool {
    /// Creates a pool of `num_workers` threads. Zero is treated as one.
    pub(crate) fn new(num_workers: usize) -> Self {
        Self {
            num_workers: num_workers.max(1),
        }
    }

    pub(crate) fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Calls `f` on every item, splitting `items` into one contiguous chunk per
    /// worker.
    pub(crate) fn try_for_each<T, E, F>(&self, items: &[T], f: F) -> Result<(), E>
    where
        T: Sync,
        E: Send + From<io::Error>,
        F: Fn(&T) -> Result<(), E> + Sync,
    {
        let mut out = vec![(); items.len()];
        self.try_map_into(items, &mut out, f)
    }

    /// Writes `f(&items[i])` to `out[i]` for every `i`.
    ///
    /// Each worker owns a disjoint chunk of `out`, so the output needs no lock.
    /// A worker stops at its first error; the first error in worker order is
    /// returned once all workers have joined. A panic in a worker is resumed on
    /// the calling thread.
    ///
    /// # Panics
    ///
    /// Panics if `items` and `out` have different lengths.
    pub(crate) fn try_map_into<T, R, E, F>(&self, items: &[T], out: &mut [R], f: F) -> Result<(), E>
    where
        T: Sync,
        R: Send,
        E: Send + From<io::Error>,
        F: Fn(&T) -> Result<R, E> + Sync,
    {
        assert_eq!(items.len(), out.len());

        if items.is_empty() {
            return Ok(());
        }

        if self.num_workers == 1 {
            return map_chunk(items, out, &f);
        }

        let chunk_len = chunk_len(items.len(), self.num_workers);
        let f = &f;

        thread::scope(|s| -> Result<(), E> {
            let mut handles = Vec::with_capacity(self.num_workers);
            for (i, (input, output)) in items
                .chunks(chunk_len)
                .zip(out.chunks_mut(chunk_len))
                .enumerate()
            {
                let handle = thread::Builder::new()
                    .name(format!("{WORKER_THREAD_NAME_PREFIX}{i}"))
                    .spawn_scoped(s, move || map_chunk(input, output, f))?;
                handles.push(handle);
            }

            let mut result = Ok(());
            for handle in handles {
                match handle.join() {
                    Ok(r) => {
                        if result.is_ok() {
                            result = r;
                        }
                    }
                    Err(payload) => panic::resume_unwind(payload),
                }
            }
            result
        })
    }
}

fn map_chunk<T, R, E, F>(input: &[T], output: &mut [R], f: &F) -> Result<(), E>
where
    F: Fn(&T) -> Result<R, E>,
{
    for (item, slot) in input.iter().zip(output.iter_mut()) {
        *slot = f(item)?;
    }
    Ok(())
}

// Ceiling division. `usize::div_ceil` needs Rust 1.73.
fn chunk_len(len: usize, num_workers: usize) -> usize {
    ((len + num_workers - 1) / num_workers).max(1)
}
