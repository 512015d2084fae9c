use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::debug;

/// Rastreador de conversao com guarda explicita de inicializacao unica.
/// Substitui o singleton de pixel injetado na pagina: a instancia e criada no
/// start da aplicacao e passada adiante, nunca mutada de um global escondido.
#[derive(Debug)]
pub struct Pixel {
    id: Option<String>,
    inicializado: AtomicBool,
    leads_enviados: AtomicU64,
}

impl Pixel {
    pub fn new(id: Option<String>) -> Self {
        Pixel {
            id: id.filter(|v| !v.trim().is_empty()),
            inicializado: AtomicBool::new(false),
            leads_enviados: AtomicU64::new(0),
        }
    }

    /// Inicializa uma unica vez. Sem id configurado e um no-op; chamadas
    /// repetidas devolvem false.
    pub fn init(&self) -> bool {
        if self.id.is_none() {
            return false;
        }
        self.inicializado
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Registra o evento "Lead" com o id de correlacao do envio, para
    /// deduplicacao contra um disparo server-side do mesmo evento logico.
    pub fn track_lead(&self, event_id: &str) {
        if !self.inicializado.load(Ordering::SeqCst) {
            return;
        }
        self.leads_enviados.fetch_add(1, Ordering::SeqCst);
        debug!("pixel: Lead disparado com event_id={event_id}");
    }

    pub fn leads_enviados(&self) -> u64 {
        self.leads_enviados.load(Ordering::SeqCst)
    }
}
