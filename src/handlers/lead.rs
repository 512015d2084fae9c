use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::ErroConfig;
use crate::models::lead::LeadRecebido;
use crate::services::assinatura::assina;
use crate::services::canonico::{canonicaliza, ErroCanonico};
use crate::services::upstream::{encaminha, traduz_resposta, CabecalhosAssinatura, ModoEnvio};
use crate::AppState;

#[derive(Error, Debug)]
pub enum ErroProxy {
    #[error("{0}")]
    Canonico(#[from] ErroCanonico),
    #[error("{0}")]
    Config(#[from] ErroConfig),
    #[error("corpo nao e json valido: {0}")]
    Json(#[from] serde_json::Error),
    #[error("falha ao chamar upstream: {0}")]
    Upstream(#[from] reqwest::Error),
}

//toda resposta sai sem cache; respostas de lead nunca devem ser reaproveitadas
pub async fn sem_cache(requisicao: Request, next: Next) -> Response {
    let mut resposta = next.run(requisicao).await;
    resposta
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    resposta
}

//cortesia para o preflight de CORS do navegador
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn metodo_nao_permitido() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST, OPTIONS")],
        Json(json!({ "error": "method_not_allowed" })),
    )
        .into_response()
}

/// `POST /api/lead`. Toda falha interna e capturada aqui e traduzida em um
/// envelope JSON; nenhuma excecao atravessa a borda sem formato. A mensagem
/// diagnostica (incluindo variavel de ambiente ausente) sobe para o caller,
/// que e o proprio formulario first-party.
pub async fn recebe_lead(State(estado): State<AppState>, corpo: String) -> Response {
    match processa_lead(&estado, corpo).await {
        Ok((status, valor)) => {
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(valor)).into_response()
        }
        Err(erro) => {
            error!("falha ao processar lead: {erro}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "ok": false,
                    "error": "internal_error",
                    "message": erro.to_string(),
                })),
            )
                .into_response()
        }
    }
}

//sequencia linear: rota -> canonicaliza -> assina -> encaminha -> traduz
async fn processa_lead(estado: &AppState, corpo: String) -> Result<(u16, Value), ErroProxy> {
    //modo de compatibilidade: webhook legado configurado encaminha o corpo
    //cru, sem canonicalizar nem assinar
    if let Some(url) = &estado.config.webhook_legado {
        debug!("encaminhando lead em modo legado para {url}");
        let resposta = encaminha(&estado.http_client, url, corpo, None).await?;
        return Ok(traduz_resposta(&resposta, ModoEnvio::Legado));
    }

    let recebido: LeadRecebido = serde_json::from_str(&corpo)?;
    let canonico = canonicaliza(&recebido)?;

    //a string assinada e exatamente o corpo enviado, byte a byte
    let corpo_canonico = serde_json::to_string(&canonico)?;
    let segredo = estado.config.segredo_assinatura()?;
    let timestamp = Utc::now().timestamp().to_string();
    let assinatura = assina(segredo, &timestamp, &corpo_canonico);

    let cabecalhos = CabecalhosAssinatura {
        key_id: estado.config.key_id.clone(),
        timestamp,
        assinatura,
    };

    let resposta = encaminha(
        &estado.http_client,
        &estado.config.url_captura,
        corpo_canonico,
        Some(&cabecalhos),
    )
    .await?;
    Ok(traduz_resposta(&resposta, ModoEnvio::Assinado))
}
