//! Privacy policy page.

use planpal_core::PrivacyPolicy;

use crate::error::ClientResult;
use crate::render;

/// Prints the privacy policy.
pub fn show() -> ClientResult<()> {
    print!("{}", render::privacy_page(&PrivacyPolicy::current()));
    Ok(())
}
