// End-to-end tests for the sprachgenerator HTTP API
//
// Each test gets its own server on an ephemeral port via test-context. The
// synthesis backend is replaced by a scripted in-memory repository and audio
// output by a recording sink, so tests run without network or sound device.

mod helpers;
mod test_catalog;
mod test_speech;
