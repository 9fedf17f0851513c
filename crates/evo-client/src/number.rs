//! Phone number normalization

/// Suffix WhatsApp uses for individual chats
pub const USER_JID_SUFFIX: &str = "@s.whatsapp.net";

/// Country code assumed for bare 11-digit (DDD + mobile) numbers
const DEFAULT_COUNTRY_CODE: &str = "55";

/// Turn a user-typed phone number into a WhatsApp JID.
///
/// Every non-digit is dropped. An 11-digit number without the `55` prefix is
/// treated as a national Brazilian mobile and gets the country code.
pub fn format_number(number: &str) -> String {
    let mut digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 11 && !digits.starts_with(DEFAULT_COUNTRY_CODE) {
        digits.insert_str(0, DEFAULT_COUNTRY_CODE);
    }

    format!("{}{}", digits, USER_JID_SUFFIX)
}
