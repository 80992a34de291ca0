use validator::ValidateEmail;

const FREE_EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "yahoo.com",
    "yahoo.co.uk",
    "hotmail.com",
    "outlook.com",
    "live.com",
    "msn.com",
    "aol.com",
    "icloud.com",
    "me.com",
    "mail.com",
    "mail.ru",
    "protonmail.com",
    "proton.me",
    "zoho.com",
    "yandex.com",
    "yandex.ru",
    "gmx.com",
    "gmx.net",
    "inbox.com",
];

fn domain_of(email: &str) -> Option<&str> {
    let (_, domain) = email.rsplit_once('@')?;
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

fn is_free_domain(domain: &str) -> bool {
    FREE_EMAIL_DOMAINS
        .iter()
        .any(|known| domain.eq_ignore_ascii_case(known))
}

pub fn is_company_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }
    match domain_of(email) {
        Some(domain) => !is_free_domain(domain),
        None => false,
    }
}

/// Human-readable rejection reason for employer sign-ups, or `None` when the
/// address is acceptable.
pub fn company_email_error_message(email: &str) -> Option<String> {
    if !email.validate_email() {
        return Some("Please enter a valid email address".to_string());
    }
    let domain = domain_of(email)?.to_ascii_lowercase();
    if is_free_domain(&domain) {
        Some(format!(
            "Personal {} addresses are not accepted for employer accounts. Please use your company email.",
            domain
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_company_domains() {
        assert!(is_company_email("user@acme.io"));
        assert!(is_company_email("hiring@startup.example.com"));
        assert!(company_email_error_message("user@acme.io").is_none());
    }

    #[test]
    fn rejects_free_providers() {
        assert!(!is_company_email("user@gmail.com"));
        assert!(!is_company_email("user@GMAIL.com"));
        assert!(!is_company_email("user@yahoo.co.uk"));

        let message = company_email_error_message("user@gmail.com").unwrap();
        assert!(message.contains("gmail.com"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_company_email("not-an-email"));
        assert!(!is_company_email("user@"));
        assert!(!is_company_email(""));
        assert!(company_email_error_message("not-an-email").is_some());
    }
}
