pub fn run() {
    println!("visitorsim v{}", visitorsim_core::VERSION);
    println!();
    println!("  {}", visitorsim_core::ABOUT);
}
