use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use crate::cadastro::atribuicao::{coletar, ArmazenamentoAtribuicao};
use crate::cadastro::pixel::Pixel;
use crate::cadastro::validacao::{valida, CamposFormulario};
use crate::models::lead::LeadRecebido;

///caminho same-origin do proxy; sobreposto via configuracao de build
pub const CAMINHO_ENDPOINT_PADRAO: &str = "/api/lead";

const ORIGEM_FORM: &str = "lp_beta_v1";
const VERSAO_CONSENTIMENTO: &str = "2026-02";
const FONTE: &str = "lp-beta";

pub const MSG_GENERICA: &str =
    "Nao foi possivel enviar. Tente novamente em alguns segundos.";
pub const MSG_DADOS_INVALIDOS: &str = "Dados invalidos. Revise os campos e tente novamente.";
pub const MSG_CAPTURA_INDISPONIVEL: &str =
    "Servidor de cadastro indisponivel. Tente novamente em alguns segundos.";
pub const MSG_INSTABILIDADE: &str =
    "Instabilidade temporaria no servidor. Tente novamente em alguns segundos.";
pub const MSG_CONFIG_PENDENTE: &str =
    "Configuracao interna pendente. Fale com o suporte.";

/// Falha de envio com a mensagem pronta para exibir. O formulario mantem os
/// campos preenchidos; reenviar e sempre uma acao manual do usuario.
#[derive(Error, Debug, PartialEq)]
#[error("{mensagem}")]
pub struct ErroEnvio {
    pub mensagem: &'static str,
}

/// Traduz o codigo de erro do servidor para a mensagem exibida. Codigo
/// desconhecido, vazio ou corpo imparseavel caem na mensagem generica.
pub fn mensagem_para_codigo(codigo: &str, mensagem: &str) -> &'static str {
    match codigo {
        "invalid_payload" => MSG_DADOS_INVALIDOS,
        "webhook_rejected_request" => MSG_CAPTURA_INDISPONIVEL,
        "lead_capture_failed" => MSG_INSTABILIDADE,
        "internal_error" if mensagem.contains("Missing env") => MSG_CONFIG_PENDENTE,
        _ => MSG_GENERICA,
    }
}

/// Cliente de envio do formulario. Um envio por vez; o chamador desabilita o
/// botao enquanto a requisicao esta em voo.
pub struct EnvioLead {
    endpoint: String,
    client: reqwest::Client,
}

impl EnvioLead {
    ///`base` e a origem da pagina, ex.: `https://falai.app`
    pub fn new(base: &str, client: reqwest::Client) -> Self {
        EnvioLead {
            endpoint: format!(
                "{}{CAMINHO_ENDPOINT_PADRAO}",
                base.trim_end_matches('/')
            ),
            client,
        }
    }

    pub fn com_endpoint(endpoint: String, client: reqwest::Client) -> Self {
        EnvioLead { endpoint, client }
    }

    /// Envia o lead: valida, coleta atribuicao, monta o corpo e faz o POST.
    /// Sucesso dispara o evento de conversao com o mesmo id de correlacao e
    /// devolve esse id; qualquer falha vira uma mensagem curta e o estado do
    /// formulario fica intacto para reenvio.
    pub async fn enviar(
        &self,
        campos: &CamposFormulario,
        pagina: &Url,
        referrer: &str,
        armazenamento: &mut dyn ArmazenamentoAtribuicao,
        pixel: &Pixel,
    ) -> Result<String, ErroEnvio> {
        if valida(campos).is_err() {
            return Err(ErroEnvio {
                mensagem: MSG_DADOS_INVALIDOS,
            });
        }

        let event_id = Uuid::new_v4().to_string();
        let atribuicao = coletar(pagina, referrer, armazenamento);

        let corpo = LeadRecebido {
            nome: campos.nome.trim().to_string(),
            email: campos.email.trim().to_string(),
            whatsapp: campos.whatsapp.clone(),
            origem: campos.origem.clone(),
            motivo: Some(format!("Origem declarada: {}", campos.origem)),
            origem_form: Some(ORIGEM_FORM.to_string()),
            consent_version: Some(VERSAO_CONSENTIMENTO.to_string()),
            source: Some(FONTE.to_string()),
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            event_id: Some(event_id.clone()),
            page_url: Some(pagina.to_string()),
            atribuicao,
        };

        let resposta = self
            .client
            .post(&self.endpoint)
            .json(&corpo)
            .send()
            .await
            .map_err(|erro| {
                error!("falha ao enviar lead para {}: {erro}", self.endpoint);
                ErroEnvio {
                    mensagem: MSG_GENERICA,
                }
            })?;

        if !resposta.status().is_success() {
            let status = resposta.status();
            //corpo de erro parseado com tolerancia: vazio ou nao-JSON vira {}
            let texto = resposta.text().await.unwrap_or_default();
            let erro: Value = serde_json::from_str(&texto).unwrap_or_else(|_| Value::Object(Default::default()));
            let codigo = erro["error"].as_str().unwrap_or_default();
            let detalhe = erro["message"].as_str().unwrap_or_default();
            debug!("lead rejeitado: status={status} codigo={codigo}");
            return Err(ErroEnvio {
                mensagem: mensagem_para_codigo(codigo, detalhe),
            });
        }

        pixel.track_lead(&event_id);
        Ok(event_id)
    }
}
