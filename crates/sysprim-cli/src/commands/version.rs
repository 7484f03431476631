//! Version command implementation.

use sysprim_direct::Platform;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

pub fn run() {
    println!("{NAME} {VERSION}");
    println!();
    println!("Cross-platform direct I/O negotiation.");
    println!();
    println!("Build info:");
    println!("  Platform:     {}", Platform::current());
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
}
