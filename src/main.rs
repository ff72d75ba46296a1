fn main() {
    veritas::cli::run();
}
