use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{self, RngCore};

/// Opaque, URL-safe certificate serial, e.g. `CERT-3q2hC7opNbk4`.
pub fn generate_certificate_number() -> String {
    let mut buf = [0u8; 9];
    rand::rng().fill_bytes(&mut buf);
    format!("CERT-{}", URL_SAFE_NO_PAD.encode(buf))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn serial_shape() {
        let serial = generate_certificate_number();
        assert!(serial.starts_with("CERT-"));
        // 9 bytes -> 12 base64 chars, no padding
        assert_eq!(serial.len(), "CERT-".len() + 12);
    }

    #[test]
    fn serials_are_unique_enough() {
        let a = generate_certificate_number();
        let b = generate_certificate_number();
        assert_ne!(a, b);
    }
}
