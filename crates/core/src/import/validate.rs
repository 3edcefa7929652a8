use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Decides whether a cleaned national identifier is well formed.
pub trait IdentifierValidator: Send + Sync {
    fn is_valid(&self, id: &str) -> bool;
}

static NRIC_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([FGMST])([0-9]{7})([A-Z])$").expect("valid NRIC regex"));

const WEIGHTS: [u32; 7] = [2, 7, 6, 5, 4, 3, 2];
const ST_LETTERS: [char; 11] = ['J', 'Z', 'I', 'H', 'G', 'F', 'E', 'D', 'C', 'B', 'A'];
const FG_LETTERS: [char; 11] = ['X', 'W', 'U', 'T', 'R', 'Q', 'P', 'N', 'M', 'L', 'K'];
const M_LETTERS: [char; 11] = ['X', 'W', 'U', 'T', 'R', 'Q', 'P', 'N', 'J', 'L', 'K'];

/// NRIC/FIN validator: prefix letter, seven digits and a weighted
/// checksum letter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NricValidator;

impl NricValidator {
    /// Expected checksum letter for a prefix and its seven digits.
    pub fn checksum(prefix: char, digits: &str) -> Option<char> {
        let mut sum: u32 = digits
            .chars()
            .zip(WEIGHTS)
            .map(|(d, w)| d.to_digit(10).unwrap_or(0) * w)
            .sum();

        match prefix {
            'T' | 'G' => sum += 4,
            'M' => sum += 3,
            _ => {}
        }
        let idx = (sum % 11) as usize;

        match prefix {
            'S' | 'T' => Some(ST_LETTERS[idx]),
            'F' | 'G' => Some(FG_LETTERS[idx]),
            'M' => Some(M_LETTERS[idx]),
            _ => None,
        }
    }
}

impl IdentifierValidator for NricValidator {
    fn is_valid(&self, id: &str) -> bool {
        let Some(caps) = NRIC_FORMAT.captures(id) else {
            return false;
        };
        let (Some(prefix), Some(check)) = (caps[1].chars().next(), caps[3].chars().next()) else {
            return false;
        };
        Self::checksum(prefix, &caps[2]) == Some(check)
    }
}
