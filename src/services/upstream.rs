use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use tracing::debug;

///corte do corpo do upstream antes de ecoar em `details`
pub const LIMITE_DETALHES: usize = 800;

pub const CABECALHO_KEY_ID: &str = "x-falai-key-id";
pub const CABECALHO_TIMESTAMP: &str = "x-falai-timestamp";
pub const CABECALHO_ASSINATURA: &str = "x-falai-signature";

/// Modo de encaminhamento; define o codigo de erro devolvido quando o
/// upstream rejeita a chamada.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModoEnvio {
    ///compatibilidade: corpo cru, sem assinatura
    Legado,
    Assinado,
}

impl ModoEnvio {
    pub fn codigo_erro(self) -> &'static str {
        match self {
            ModoEnvio::Legado => "webhook_rejected_request",
            ModoEnvio::Assinado => "lead_capture_failed",
        }
    }
}

pub struct CabecalhosAssinatura {
    pub key_id: String,
    pub timestamp: String,
    pub assinatura: String,
}

pub struct RespostaUpstream {
    pub status: u16,
    pub corpo: String,
}

/// Uma unica chamada POST ao upstream, sem retry; o timeout vem do cliente
/// compartilhado. O corpo da resposta e lido como texto primeiro para limitar
/// o que vai para log e para o `details`.
pub async fn encaminha(
    client: &reqwest::Client,
    url: &str,
    corpo: String,
    cabecalhos: Option<&CabecalhosAssinatura>,
) -> Result<RespostaUpstream, reqwest::Error> {
    let mut requisicao = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(corpo);

    if let Some(cabecalhos) = cabecalhos {
        requisicao = requisicao
            .header(CABECALHO_KEY_ID, &cabecalhos.key_id)
            .header(CABECALHO_TIMESTAMP, &cabecalhos.timestamp)
            .header(CABECALHO_ASSINATURA, &cabecalhos.assinatura);
    }

    let resposta = requisicao.send().await?;
    let status = resposta.status().as_u16();
    let corpo = resposta.text().await.unwrap_or_default();
    debug!("upstream {} respondeu {}", url, status);

    Ok(RespostaUpstream { status, corpo })
}

/// Traduz a resposta do upstream para o envelope devolvido ao formulario.
/// Sucesso vira `{ok:true, upstreamPayload}` com o payload omitido quando o
/// corpo nao e JSON; rejeicao vira 502 com o codigo do modo e os detalhes
/// truncados.
pub fn traduz_resposta(resposta: &RespostaUpstream, modo: ModoEnvio) -> (u16, Value) {
    if !(200..300).contains(&resposta.status) {
        let detalhes: String = resposta.corpo.chars().take(LIMITE_DETALHES).collect();
        return (
            502,
            json!({
                "ok": false,
                "error": modo.codigo_erro(),
                "upstream_status": resposta.status,
                "details": detalhes,
            }),
        );
    }

    match serde_json::from_str::<Value>(&resposta.corpo) {
        Ok(payload) => (200, json!({ "ok": true, "upstreamPayload": payload })),
        Err(_) => (200, json!({ "ok": true })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resposta(status: u16, corpo: &str) -> RespostaUpstream {
        RespostaUpstream {
            status,
            corpo: corpo.to_string(),
        }
    }

    #[test]
    fn sucesso_embrulha_payload_do_upstream() {
        let (status, corpo) = traduz_resposta(&resposta(200, r#"{"id":"abc"}"#), ModoEnvio::Assinado);
        assert_eq!(status, 200);
        assert_eq!(corpo, json!({"ok": true, "upstreamPayload": {"id": "abc"}}));
    }

    #[test]
    fn sucesso_sem_json_vira_ok_simples() {
        let (status, corpo) = traduz_resposta(&resposta(201, "criado"), ModoEnvio::Assinado);
        assert_eq!(status, 200);
        assert_eq!(corpo, json!({"ok": true}));
    }

    #[test]
    fn rejeicao_assinada_usa_codigo_de_captura() {
        let (status, corpo) = traduz_resposta(&resposta(503, "bad gateway"), ModoEnvio::Assinado);
        assert_eq!(status, 502);
        assert_eq!(
            corpo,
            json!({
                "ok": false,
                "error": "lead_capture_failed",
                "upstream_status": 503,
                "details": "bad gateway",
            })
        );
    }

    #[test]
    fn rejeicao_legada_usa_codigo_de_webhook() {
        let (_, corpo) = traduz_resposta(&resposta(400, "{}"), ModoEnvio::Legado);
        assert_eq!(corpo["error"], "webhook_rejected_request");
    }

    #[test]
    fn detalhes_sao_truncados_em_800_caracteres() {
        let grande = "x".repeat(5000);
        let (_, corpo) = traduz_resposta(&resposta(500, &grande), ModoEnvio::Assinado);
        assert_eq!(corpo["details"].as_str().unwrap().len(), LIMITE_DETALHES);
    }
}
