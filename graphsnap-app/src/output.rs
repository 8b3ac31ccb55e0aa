use graphsnap_social::bsky::Account;
use std::io::{self, Write};

/// One `did,handle` line per account, in the order given.
pub fn write_accounts<W: Write>(out: &mut W, accounts: &[Account]) -> io::Result<()> {
    for account in accounts {
        writeln!(out, "{},{}", account.did, account.handle)?;
    }
    Ok(())
}

/// The bare DID; no newline so callers can capture it verbatim.
pub fn write_id<W: Write>(out: &mut W, did: &str) -> io::Result<()> {
    out.write_all(did.as_bytes())
}
