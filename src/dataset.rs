// File: src/dataset.rs
use crate::core::types::{Category, TrainingExample};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// How many times the seed phrases are repeated to build the demo corpus.
pub const REPLICATION: usize = 5;

const HARDWARE: [&str; 20] = [
    "Laptop screen is flickering", "Mouse not working", "Keyboard keys stuck", "Printer jamming",
    "Monitor won't turn on", "Laptop battery drains fast", "External hard drive not detected",
    "Webcam shows black screen", "Touchpad unresponsive", "Headset microphone broken",
    "Docking station not charging", "Projector bulb burnt out", "Scanner not connecting",
    "USB port loose", "Fan making loud noise", "Laptop overheating", "Screen has dead pixels",
    "Power adapter frayed", "Bluetooth mouse lagging", "Second monitor no signal",
];

const NETWORK: [&str; 20] = [
    "Cannot connect to WiFi", "Internet is very slow", "VPN connection failed",
    "DNS resolution error", "Packet loss high", "Network drive inaccessible",
    "Zoom call dropping", "Ethernet cable broken", "Firewall blocking site",
    "IP address conflict", "WiFi password incorrect", "Router needs restart",
    "Download speed slow", "Upload failed", "Cannot access intranet", "VPN keeps disconnecting",
    "Ping is too high", "Default gateway unreachable", "Network printer offline",
    "SSL certificate error",
];

const SOFTWARE: [&str; 20] = [
    "Outlook crashing on startup", "Excel visualization error", "Adobe Reader not opening",
    "Chrome keeps freezing", "Windows update failed", "Slack messages not syncing",
    "Teams audio issues", "Jira ticket not saving", "VS Code extensions missing",
    "Python environment broken", "Java update required", "Browser cache issue",
    "Software license expired", "Application access denied", "CRM login loop",
    "SharePoint file locked", "OneDrive not syncing", "Zoom update stuck",
    "Antivirus blocking install", "OS activated warning",
];

const SECURITY: [&str; 20] = [
    "Suspicious email attachment", "Password reset required", "2FA code not received",
    "Phishing attempt detected", "Account locked out", "Virus alert popup",
    "Malware scan requested", "Unauthorized login attempt", "Security token expired",
    "Badge access denied", "Encrypted file unreadable", "USB drive blocked",
    "Admin rights needed", "Compromised credentials", "Spam filter too aggressive",
    "Unusual activity detected", "Screen lock policy", "Password change forced",
    "VPN certificate invalid", "Data breach suspected",
];

const ACCOUNT_ACCESS: [&str; 20] = [
    "Forgot my password", "Cannot login to email", "User account disabled",
    "Need access to shared folder", "Create new user account", "Profile picture update",
    "Change display name", "Unlock AD account", "Permission denied for folder",
    "Role update request", "SSO login failure", "MFA device lost", "Account expiration warning",
    "Guest wifi access", "Offboarding user request", "Onboarding setup needed",
    "Email alias request", "Distribution list add", "Slack channel access", "VPN access request",
];

/// The hand-written seed phrases for one category.
pub fn seed_phrases(category: Category) -> &'static [&'static str; 20] {
    match category {
        Category::Hardware => &HARDWARE,
        Category::Network => &NETWORK,
        Category::Software => &SOFTWARE,
        Category::Security => &SECURITY,
        Category::AccountAccess => &ACCOUNT_ACCESS,
    }
}

/// Builds the fixed demo corpus: 100 seed phrases repeated `REPLICATION`
/// times, 500 examples with 100 per category. The output is always the same.
pub fn synthetic_corpus() -> Vec<TrainingExample> {
    let order = [
        Category::Hardware,
        Category::Network,
        Category::Software,
        Category::Security,
        Category::AccountAccess,
    ];
    let mut corpus = Vec::with_capacity(100 * REPLICATION);
    for _ in 0..REPLICATION {
        for category in order {
            corpus.extend(
                seed_phrases(category)
                    .iter()
                    .map(|text| TrainingExample::new(*text, category)),
            );
        }
    }
    corpus
}

/// Shuffles with a fixed seed, then cuts off `test_fraction` of the examples
/// (rounded up) as a held-out set. Returns `(train, test)`.
pub fn train_test_split(
    mut examples: Vec<TrainingExample>,
    test_fraction: f64,
    seed: u64,
) -> (Vec<TrainingExample>, Vec<TrainingExample>) {
    let mut rng = StdRng::seed_from_u64(seed);
    examples.shuffle(&mut rng);

    let fraction = test_fraction.clamp(0.0, 1.0);
    let n_test = ((examples.len() as f64) * fraction).ceil() as usize;
    let n_test = n_test.min(examples.len().saturating_sub(1));
    let test = examples.split_off(examples.len() - n_test);
    (examples, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_is_balanced() {
        let corpus = synthetic_corpus();
        assert_eq!(corpus.len(), 500);
        for category in Category::ALL {
            let n = corpus.iter().filter(|e| e.category == category).count();
            assert_eq!(n, 100, "{category}");
        }
    }

    #[test]
    fn corpus_is_deterministic() {
        assert_eq!(synthetic_corpus(), synthetic_corpus());
    }

    #[test]
    fn split_is_eighty_twenty_and_seeded() {
        let (train, test) = train_test_split(synthetic_corpus(), 0.2, 42);
        assert_eq!(train.len(), 400);
        assert_eq!(test.len(), 100);

        let (train_again, test_again) = train_test_split(synthetic_corpus(), 0.2, 42);
        assert_eq!(train, train_again);
        assert_eq!(test, test_again);

        let (other, _) = train_test_split(synthetic_corpus(), 0.2, 7);
        assert_ne!(train, other);
    }

    #[test]
    fn split_keeps_at_least_one_training_example() {
        let corpus = synthetic_corpus()[..3].to_vec();
        let (train, test) = train_test_split(corpus, 1.0, 1);
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 2);
    }
}
