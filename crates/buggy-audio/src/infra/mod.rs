pub mod mix_trace;
