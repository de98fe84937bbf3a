fn main() {
    // option_env!() values are cached by cargo unless it is told to watch them.
    println!("cargo:rerun-if-env-changed=JOBBOARD_API_URL");
    println!("cargo:rerun-if-env-changed=JOBBOARD_WS_HOST");
}
