//! Sensor stream demo
//!
//! A producer task pushes noisy sensor frames into a shared buffer while a
//! consumer task draws mini-batches from it, removing what it trains on.
//!
//! Run with `RUST_LOG=replay_buffer=debug` to see evictions.

use anyhow::Result;
use ndarray::{Array1, Axis, Ix1};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use replay_buffer::{BoundedSamplingBuffer, BufferConfig, SharedBuffer};
use tracing_subscriber::EnvFilter;

const FRAME_LEN: usize = 8;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = BufferConfig::new(128)
        .with_seed(7)
        .with_record_shape([FRAME_LEN]);
    let buffer: SharedBuffer<f32, Ix1> = BoundedSamplingBuffer::from_config(&config)?.into();

    let producer = {
        let buffer = buffer.clone();
        tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(1);
            let noise = Normal::new(0.0_f32, 0.1)?;
            let mut evictions = 0usize;

            for step in 0..500u16 {
                let level = f32::from(step).sin();
                let frame: Array1<f32> =
                    (0..FRAME_LEN).map(|_| level + noise.sample(&mut rng)).collect();
                if buffer.insert(&[frame]).await? {
                    evictions += 1;
                }
                tokio::task::yield_now().await;
            }
            anyhow::Ok(evictions)
        })
    };

    let consumer = {
        let buffer = buffer.clone();
        tokio::spawn(async move {
            let mut batches = 0usize;
            let mut frames = 0usize;

            for _ in 0..100 {
                if let Some(sampled) = buffer.sample(16, true).await? {
                    let batch = sampled.into_batch().unwrap_or_default();
                    frames += batch.len_of(Axis(0));
                    batches += 1;
                    tracing::info!(batch = batches, mean = batch.mean().unwrap_or(0.0), "consumed batch");
                }
                tokio::task::yield_now().await;
            }
            anyhow::Ok((batches, frames))
        })
    };

    let evictions = producer.await??;
    let (batches, frames) = consumer.await??;

    println!("Produced 500 frames, {evictions} inserts evicted older frames");
    println!("Consumed {frames} frames in {batches} batches");
    println!("Frames left in buffer: {}", buffer.len().await);

    Ok(())
}
