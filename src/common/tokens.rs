// src/common/tokens.rs

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};

/// Token usado pelo wizard enquanto o lead ainda não existe.
/// Nunca é um token válido do portal.
pub const PENDING_PORTAL_TOKEN: &str = "new";

// Sem 0/O/1/I para a referência poder ser ditada por telefone
const REFERENCE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Menor comprimento aceito para o token do portal, em caracteres.
pub const MIN_PORTAL_TOKEN_LENGTH: usize = 16;

/// Gera o token opaco do portal com `length` caracteres alfanuméricos (seguro para URL).
pub fn generate_portal_token(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Referência legível: QT-AAAAMMDD-XXXXXX
pub fn generate_reference_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect();
    format!("QT-{}-{}", now.format("%Y%m%d"), suffix)
}
