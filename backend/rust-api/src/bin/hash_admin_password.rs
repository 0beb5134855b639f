// Prints a bcrypt hash for ADMIN_PASSWORD_HASH.
// Usage: cargo run --bin hash_admin_password -- <password>

use bcrypt::hash;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hash an admin password for ADMIN_PASSWORD_HASH")]
struct Args {
    password: String,

    /// bcrypt work factor
    #[arg(long, default_value_t = bcrypt::DEFAULT_COST)]
    cost: u32,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.password.len() < 8 {
        anyhow::bail!("Password must be at least 8 characters");
    }

    let password_hash = hash(&args.password, args.cost)?;
    println!("ADMIN_PASSWORD_HASH={}", password_hash);
    Ok(())
}
