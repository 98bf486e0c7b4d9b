use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use time::{Date, OffsetDateTime};
use tracing::warn;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

pub fn hash_file(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut h = Sha256::new();
    let mut buf = vec![0u8; 1024 * 1024];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        h.update(&buf[..n]);
    }
    Ok(format!("{:x}", h.finalize()))
}

/// Today's date at the local offset, if the offset can be read.
///
/// On Unix `time` refuses to read the offset once a second thread exists, so the CLI calls
/// this before logging starts its writer thread.
pub fn local_date() -> Option<Date> {
    OffsetDateTime::now_local().ok().map(|t| t.date())
}

/// `local`, or today's UTC date (with a warning) when the local offset was unavailable.
pub fn date_or_utc(local: Option<Date>) -> Date {
    local.unwrap_or_else(|| {
        let utc = OffsetDateTime::now_utc().date();
        warn!("local UTC offset unavailable; using UTC date {utc}");
        utc
    })
}

pub fn today_local() -> Date {
    date_or_utc(local_date())
}
