use serde::{Deserialize, Serialize};

/// Parametros de marketing capturados na pagina. O registro sobrevive a
/// navegacao via armazenamento local do cliente; no servidor ele so passa
/// adiante dentro de `meta.tracking`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Atribuicao {
    #[serde(default)]
    pub utm_source: String,
    #[serde(default)]
    pub utm_medium: String,
    #[serde(default)]
    pub utm_campaign: String,
    #[serde(default)]
    pub utm_content: String,
    #[serde(default)]
    pub utm_term: String,
    #[serde(default)]
    pub fbclid: String,
    #[serde(default)]
    pub gclid: String,
    #[serde(default)]
    pub referrer: String,
    #[serde(default)]
    pub page_path: String,
    #[serde(default)]
    pub landing_variant: String,
}

/// Corpo que o formulario envia para `POST /api/lead`. Todos os campos tem
/// default para que o parse nunca rejeite um corpo parcial; quem decide o que
/// e obrigatorio e a canonicalizacao.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadRecebido {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub origem: String,
    #[serde(default)]
    pub motivo: Option<String>,
    #[serde(default)]
    pub origem_form: Option<String>,
    #[serde(default)]
    pub consent_version: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(flatten)]
    pub atribuicao: Atribuicao,
}

/// Bloco de consentimento e rastreamento anexado ao payload canonico.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaLead {
    pub consent_version: String,
    ///relogio do servidor no momento da canonicalizacao, ISO-8601
    pub consent_timestamp: String,
    pub tracking: Atribuicao,
}

/// Versao sanitizada e confiavel do lead, montada no servidor. E exatamente
/// este JSON, byte a byte, que a assinatura cobre e que segue para o servico
/// de captura.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadCanonico {
    pub nome: String,
    pub email: String,
    pub whatsapp: String,
    pub origem: String,
    pub motivo: String,
    pub origem_form: String,
    pub source: String,
    pub page_url: String,
    pub event_id: String,
    ///uuid v4 novo a cada requisicao, para deduplicacao no upstream
    pub idempotency_key: String,
    pub meta: MetaLead,
}
