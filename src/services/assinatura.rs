use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Assina `"{timestamp}.{corpo}"` com HMAC-SHA256 e devolve o digest em hex
/// minusculo. O corpo precisa ser exatamente os bytes enviados ao upstream,
/// senao a verificacao do outro lado falha.
pub fn assina(segredo: &str, timestamp: &str, corpo: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(segredo.as_bytes())
        .expect("hmac aceita chave de qualquer tamanho");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(corpo.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    //vetor fixo conferido contra uma implementacao de referencia
    #[test]
    fn vetor_fixo() {
        assert_eq!(
            assina("s", "1700000000", "{}"),
            "e9232c9945da8456c2dea6b39da7786c07b00bca7a64d5dd1283674713a7b72a"
        );
    }

    #[test]
    fn vetor_com_corpo_nao_trivial() {
        assert_eq!(
            assina("test-secret", "1700000000", r#"{"nome":"Ana"}"#),
            "87ef17b9b3ccc858def09f96cd746c7e6918dd88f393179f80d9eb1aee16705e"
        );
    }

    #[test]
    fn segredos_diferentes_geram_assinaturas_diferentes() {
        assert_ne!(
            assina("a", "1700000000", "{}"),
            assina("b", "1700000000", "{}")
        );
    }
}
