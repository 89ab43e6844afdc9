pub mod silero_vad;
