use anyhow::{Context, Result, anyhow};
use totp_rs::{Algorithm, Secret, TOTP};

fn main() -> Result<()> {
    let secret = std::env::args()
        .nth(1)
        .context("usage: otp <BASE32_SECRET>")?;
    let key = Secret::Encoded(secret)
        .to_bytes()
        .map_err(|err| anyhow!("invalid base32 secret: {:?}", err))?;
    let totp = TOTP::new_unchecked(Algorithm::SHA1, 6, 1, 30, key);
    println!("{}", totp.generate_current()?);
    Ok(())
}
