use std::env;
use std::time::Duration;

use thiserror::Error;

///URL de captura usada quando LEAD_CAPTURE_URL nao esta definida
pub const URL_CAPTURA_PADRAO: &str = "https://editor.otaldogestorai.com.br/webhook/falai-captura";

const KEY_ID_PADRAO: &str = "v1";
const TIMEOUT_UPSTREAM_PADRAO: u64 = 10;

#[derive(Error, Debug)]
pub enum ErroConfig {
    //a mensagem chega ao cliente first-party e precisa nomear a variavel
    #[error("Missing env {0}")]
    SegredoAusente(String),
}

/// Fonte nomeada de segredo de assinatura. As fontes sao resolvidas na ordem
/// em que aparecem no vetor, o que permite injetar a lista inteira nos testes
/// em vez de depender do ambiente do processo.
#[derive(Debug, Clone)]
pub struct FonteSegredo {
    pub nome: String,
    pub valor: Option<String>,
}

/// Configuracao imutavel do processo, resolvida uma unica vez no bootstrap.
#[derive(Debug, Clone)]
pub struct Config {
    ///quando presente, ativa o modo de compatibilidade: encaminha o corpo cru
    pub webhook_legado: Option<String>,
    pub url_captura: String,
    pub key_id: String,
    pub fontes_segredo: Vec<FonteSegredo>,
    pub timeout_upstream: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let key_id = le_env("LEAD_SIGNING_KEY_ID").unwrap_or_else(|| KEY_ID_PADRAO.to_string());
        let fontes_segredo = fontes_para_key_id(&key_id)
            .into_iter()
            .map(|nome| FonteSegredo {
                valor: le_env(&nome),
                nome,
            })
            .collect();

        Config {
            webhook_legado: le_env("LEAD_WEBHOOK_URL").or_else(|| le_env("VITE_LEAD_WEBHOOK_URL")),
            url_captura: le_env("LEAD_CAPTURE_URL")
                .unwrap_or_else(|| URL_CAPTURA_PADRAO.to_string()),
            key_id,
            fontes_segredo,
            timeout_upstream: Duration::from_secs(
                le_env("LEAD_UPSTREAM_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(TIMEOUT_UPSTREAM_PADRAO),
            ),
        }
    }

    /// Percorre as fontes em ordem e devolve o primeiro segredo presente.
    /// O erro nomeia a variavel preferida para facilitar o diagnostico do
    /// operador.
    pub fn segredo_assinatura(&self) -> Result<&str, ErroConfig> {
        self.fontes_segredo
            .iter()
            .find_map(|fonte| fonte.valor.as_deref())
            .ok_or_else(|| {
                let nome = self
                    .fontes_segredo
                    .first()
                    .map(|fonte| fonte.nome.clone())
                    .unwrap_or_else(|| "LEAD_SIGNING_SECRET".to_string());
                ErroConfig::SegredoAusente(nome)
            })
    }
}

/// Nomes de variavel candidatos para o segredo, do mais especifico ao
/// generico.
pub fn fontes_para_key_id(key_id: &str) -> Vec<String> {
    let sufixo = key_id.to_uppercase().replace('-', "_");
    vec![
        format!("LEAD_SIGNING_SECRET_{sufixo}"),
        format!("LEAD_CAPTURE_SECRET_{sufixo}"),
        "LEAD_SIGNING_SECRET".to_string(),
    ]
}

//variavel vazia conta como ausente
fn le_env(nome: &str) -> Option<String> {
    env::var(nome).ok().filter(|v| !v.trim().is_empty())
}
