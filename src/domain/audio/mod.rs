//! PCM and WAV codec domain module

mod pcm;
mod wav;

pub use pcm::{quantize_sample, PcmBuffer, PcmLayoutError};
pub use wav::{
    encode_wav, seal_wav_sizes, streaming_header, write_pcm16, WavDescriptor, STREAMING_SIZE,
    WAV_HEADER_LEN,
};
