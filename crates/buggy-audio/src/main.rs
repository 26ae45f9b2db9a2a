fn main() {
    buggy_audio::runtime::run_from_args();
}
