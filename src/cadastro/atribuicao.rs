use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::warn;
use url::Url;

use crate::models::lead::Atribuicao;

///prefixo fixo das chaves persistidas, analogo ao localStorage da pagina
pub const PREFIXO_CHAVE: &str = "falai_attr_";

//parametros de URL capturados um a um
const PARAMETROS: [&str; 7] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
    "fbclid",
    "gclid",
];

/// Armazenamento chave/valor durável entre visitas. Sem expiracao; um valor
/// novo observado na URL sempre sobrescreve o anterior.
pub trait ArmazenamentoAtribuicao {
    fn le(&self, chave: &str) -> Option<String>;
    fn grava(&mut self, chave: &str, valor: &str);
}

/// Armazenamento em memoria, usado em testes e sessoes efemeras.
#[derive(Debug, Default)]
pub struct MemoriaAtribuicao {
    valores: HashMap<String, String>,
}

impl ArmazenamentoAtribuicao for MemoriaAtribuicao {
    fn le(&self, chave: &str) -> Option<String> {
        self.valores.get(chave).cloned()
    }

    fn grava(&mut self, chave: &str, valor: &str) {
        self.valores.insert(chave.to_string(), valor.to_string());
    }
}

/// Armazenamento persistido em um arquivo JSON. Escrita nao atomica, igual ao
/// localStorage que substitui: uso single-user, corrida entre abas nao e um
/// cenario suportado.
#[derive(Debug)]
pub struct ArquivoAtribuicao {
    caminho: PathBuf,
    valores: HashMap<String, String>,
}

impl ArquivoAtribuicao {
    pub fn abre(caminho: PathBuf) -> Self {
        let valores = fs::read_to_string(&caminho)
            .ok()
            .and_then(|texto| serde_json::from_str(&texto).ok())
            .unwrap_or_default();
        ArquivoAtribuicao { caminho, valores }
    }

    fn persiste(&self) {
        match serde_json::to_string(&self.valores) {
            Ok(texto) => {
                if let Err(erro) = fs::write(&self.caminho, texto) {
                    warn!("falha ao persistir atribuicao em {:?}: {erro}", self.caminho);
                }
            }
            Err(erro) => warn!("falha ao serializar atribuicao: {erro}"),
        }
    }
}

impl ArmazenamentoAtribuicao for ArquivoAtribuicao {
    fn le(&self, chave: &str) -> Option<String> {
        self.valores.get(chave).cloned()
    }

    fn grava(&mut self, chave: &str, valor: &str) {
        self.valores.insert(chave.to_string(), valor.to_string());
        self.persiste();
    }
}

/// Coleta a atribuicao da visita atual. Valor presente na URL ganha do
/// armazenado e e gravado de volta; ausente cai para o ultimo valor
/// armazenado, com default vazio. Sem rede e sem modo de falha.
pub fn coletar(
    pagina: &Url,
    referrer: &str,
    armazenamento: &mut dyn ArmazenamentoAtribuicao,
) -> Atribuicao {
    let parametros: HashMap<String, String> = pagina
        .query_pairs()
        .map(|(chave, valor)| (chave.into_owned(), valor.into_owned()))
        .collect();

    let mut resolve = |nome: &str, atual: Option<&str>| -> String {
        let chave = format!("{PREFIXO_CHAVE}{nome}");
        match atual.filter(|v| !v.is_empty()) {
            Some(valor) => {
                armazenamento.grava(&chave, valor);
                valor.to_string()
            }
            None => armazenamento.le(&chave).unwrap_or_default(),
        }
    };

    let mut valores: HashMap<&str, String> = HashMap::new();
    for nome in PARAMETROS {
        valores.insert(nome, resolve(nome, parametros.get(nome).map(String::as_str)));
    }

    //landing_variant vem de `variant` ou `ab`, nessa ordem
    let variante = parametros
        .get("variant")
        .or_else(|| parametros.get("ab"))
        .map(String::as_str);
    let landing_variant = resolve("landing_variant", variante);
    let referrer = resolve("referrer", Some(referrer));
    let page_path = resolve("page_path", Some(pagina.path()));

    Atribuicao {
        utm_source: valores.remove("utm_source").unwrap_or_default(),
        utm_medium: valores.remove("utm_medium").unwrap_or_default(),
        utm_campaign: valores.remove("utm_campaign").unwrap_or_default(),
        utm_content: valores.remove("utm_content").unwrap_or_default(),
        utm_term: valores.remove("utm_term").unwrap_or_default(),
        fbclid: valores.remove("fbclid").unwrap_or_default(),
        gclid: valores.remove("gclid").unwrap_or_default(),
        referrer,
        page_path,
        landing_variant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(texto: &str) -> Url {
        Url::parse(texto).unwrap()
    }

    #[test]
    fn valor_da_url_e_gravado_e_sobrevive_a_proxima_visita() {
        let mut memoria = MemoriaAtribuicao::default();
        let primeira = coletar(
            &url("https://falai.app/?utm_source=fb&utm_campaign=x"),
            "",
            &mut memoria,
        );
        assert_eq!(primeira.utm_source, "fb");
        assert_eq!(primeira.utm_campaign, "x");

        //segunda visita sem query: cai para o armazenado
        let segunda = coletar(&url("https://falai.app/"), "", &mut memoria);
        assert_eq!(segunda.utm_source, "fb");
        assert_eq!(segunda.utm_campaign, "x");
    }

    #[test]
    fn valor_novo_na_url_sobrescreve_o_armazenado() {
        let mut memoria = MemoriaAtribuicao::default();
        coletar(&url("https://falai.app/?utm_source=fb"), "", &mut memoria);
        let depois = coletar(&url("https://falai.app/?utm_source=ig"), "", &mut memoria);
        assert_eq!(depois.utm_source, "ig");
        assert_eq!(
            memoria.le("falai_attr_utm_source").as_deref(),
            Some("ig")
        );
    }

    #[test]
    fn ausente_em_todo_lugar_vira_string_vazia() {
        let mut memoria = MemoriaAtribuicao::default();
        let atribuicao = coletar(&url("https://falai.app/"), "", &mut memoria);
        assert_eq!(atribuicao.gclid, "");
        assert_eq!(atribuicao.utm_term, "");
    }

    #[test]
    fn landing_variant_aceita_variant_ou_ab() {
        let mut memoria = MemoriaAtribuicao::default();
        let com_variant = coletar(&url("https://falai.app/?variant=b"), "", &mut memoria);
        assert_eq!(com_variant.landing_variant, "b");

        let mut memoria = MemoriaAtribuicao::default();
        let com_ab = coletar(&url("https://falai.app/?ab=c"), "", &mut memoria);
        assert_eq!(com_ab.landing_variant, "c");
    }

    #[test]
    fn referrer_e_caminho_entram_no_registro() {
        let mut memoria = MemoriaAtribuicao::default();
        let atribuicao = coletar(
            &url("https://falai.app/beta?utm_source=fb"),
            "https://instagram.com/",
            &mut memoria,
        );
        assert_eq!(atribuicao.referrer, "https://instagram.com/");
        assert_eq!(atribuicao.page_path, "/beta");
    }

    #[test]
    fn arquivo_persiste_entre_aberturas() {
        let dir = tempfile::tempdir().unwrap();
        let caminho = dir.path().join("atribuicao.json");

        let mut arquivo = ArquivoAtribuicao::abre(caminho.clone());
        coletar(&url("https://falai.app/?gclid=g123"), "", &mut arquivo);
        drop(arquivo);

        let mut reaberto = ArquivoAtribuicao::abre(caminho);
        let atribuicao = coletar(&url("https://falai.app/"), "", &mut reaberto);
        assert_eq!(atribuicao.gclid, "g123");
    }
}
