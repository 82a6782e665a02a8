/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use stardust::{CellMutation, CellType, Teleport, TickReport};

/// Which effect a tick should trigger, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sfx {
    Place,
    Destroy,
    Raise,
    Warp,
    Fall,
}

/// Teleports win over cell changes; a tick plays at most one effect.
pub fn sfx_for(report: &TickReport) -> Option<Sfx> {
    match report.teleport {
        Some(Teleport::PortalReset) => return Some(Sfx::Warp),
        Some(Teleport::FellOffMap) => return Some(Sfx::Fall),
        None => {}
    }
    report.mutations.first().map(sfx_for_mutation)
}

fn sfx_for_mutation(m: &CellMutation) -> Sfx {
    match m.new {
        CellType::GreenStardust => Sfx::Raise,
        CellType::Empty => Sfx::Destroy,
        _ => Sfx::Place,
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_place: Arc<Vec<u8>>,
        sfx_destroy: Arc<Vec<u8>>,
        sfx_raise: Arc<Vec<u8>>,
        sfx_warp: Arc<Vec<u8>>,
        sfx_fall: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::info!("audio output unavailable: {e}");
                    return None;
                }
            };

            // ── Generate all sound buffers ──
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_place: Arc::new(make_wav(&gen_blip(880.0, 0.06, 0.25))),
                sfx_destroy: Arc::new(make_wav(&gen_crumble())),
                sfx_raise: Arc::new(make_wav(&gen_rise())),
                sfx_warp: Arc::new(make_wav(&gen_warp())),
                sfx_fall: Arc::new(make_wav(&gen_fall())),
            })
        }

        fn play_buf(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = match sfx {
                Sfx::Place => &self.sfx_place,
                Sfx::Destroy => &self.sfx_destroy,
                Sfx::Raise => &self.sfx_raise,
                Sfx::Warp => &self.sfx_warp,
                Sfx::Fall => &self.sfx_fall,
            };
            self.play_buf(buf);
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Simple sine blip at given frequency and duration
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32); // linear fade out
                (t * freq * 2.0 * std::f32::consts::PI).sin() * env * volume
            })
            .collect()
    }

    /// Destroy: short noise burst with descending pitch
    fn gen_crumble() -> Vec<f32> {
        let duration = 0.12;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 12345;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 200.0 + (1.0 - t) * 300.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * freq * 2.0 * std::f32::consts::PI).sin();
                // Simple LCG noise
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(0.8);
                (tone * 0.4 + noise * 0.6) * env * 0.3
            })
            .collect()
    }

    /// Raise: quick ascending arpeggio C5→E5→G5
    fn gen_rise() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0];
        let note_dur = 0.04;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                // Square-ish wave (sine + 3rd harmonic) for retro feel
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (t * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Portal: wobbling upward sweep
    fn gen_warp() -> Vec<f32> {
        let duration = 0.3;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let wobble = (t * 40.0 * std::f32::consts::PI).sin() * 60.0;
                let freq = 300.0 + t * 900.0 + wobble;
                phase += freq / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.7);
                (phase * 2.0 * std::f32::consts::PI).sin() * env * 0.25
            })
            .collect()
    }

    /// Fell off the map: short descending whistle
    fn gen_fall() -> Vec<f32> {
        let duration = 0.2;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 600.0 - t * 400.0; // 600Hz → 200Hz
                let ti = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.6);
                (ti * freq * 2.0 * std::f32::consts::PI).sin() * env * 0.25
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_sample_count() {
            let wav = make_wav(&gen_blip(440.0, 0.01, 0.5));
            let n = (SAMPLE_RATE as f32 * 0.01) as usize;
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + n * 2);
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardust::Position;

    fn report(mutations: Vec<CellMutation>, teleport: Option<Teleport>) -> TickReport {
        TickReport {
            position: Position::new(2, 4),
            facing_left: false,
            mutations,
            teleport,
            accepted: true,
        }
    }

    fn change(old: CellType, new: CellType) -> CellMutation {
        CellMutation { row: 3, col: 5, old, new }
    }

    #[test]
    fn quiet_tick_plays_nothing() {
        assert_eq!(sfx_for(&report(Vec::new(), None)), None);
    }

    #[test]
    fn mutation_kind_picks_effect() {
        let place = report(vec![change(CellType::Empty, CellType::BlueStardust)], None);
        assert_eq!(sfx_for(&place), Some(Sfx::Place));
        let destroy = report(vec![change(CellType::DestroyableStardust, CellType::Empty)], None);
        assert_eq!(sfx_for(&destroy), Some(Sfx::Destroy));
        let raise = report(vec![change(CellType::Empty, CellType::GreenStardust)], None);
        assert_eq!(sfx_for(&raise), Some(Sfx::Raise));
    }

    #[test]
    fn teleport_wins() {
        let r = report(
            vec![change(CellType::Empty, CellType::BlueStardust)],
            Some(Teleport::PortalReset),
        );
        assert_eq!(sfx_for(&r), Some(Sfx::Warp));
        assert_eq!(sfx_for(&report(Vec::new(), Some(Teleport::FellOffMap))), Some(Sfx::Fall));
    }
}
