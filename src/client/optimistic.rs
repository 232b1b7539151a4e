// src/client/optimistic.rs
// Mutação local imediata, confirmada ou desfeita pela resposta do servidor.

use std::future::Future;

/// Aviso para o usuário (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Guarda o estado anterior à mutação para poder desfazê-la.
#[must_use = "confirme ou desfaça a mutação"]
pub struct OptimisticCommand<T> {
    snapshot: T,
}

impl<T: Clone> OptimisticCommand<T> {
    pub fn apply(local: &mut T, mutation: impl FnOnce(&mut T)) -> Self {
        let snapshot = local.clone();
        mutation(local);
        Self { snapshot }
    }

    pub fn commit(self) {}

    pub fn rollback(self, local: &mut T) {
        *local = self.snapshot;
    }
}

/// Aplica `mutation`, aguarda `remote` e desfaz se ele falhar.
///
/// `remote` já deve estar construído: ele não pode emprestar `local`.
pub async fn execute<T, R, E, F>(
    local: &mut T,
    mutation: impl FnOnce(&mut T),
    remote: F,
) -> Result<R, E>
where
    T: Clone,
    F: Future<Output = Result<R, E>>,
{
    let command = OptimisticCommand::apply(local, mutation);
    match remote.await {
        Ok(value) => {
            command.commit();
            Ok(value)
        }
        Err(e) => {
            command.rollback(local);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_keeps_the_mutation() {
        let mut items = vec![1, 2, 3];
        let result: Result<(), ()> = execute(&mut items, |v| v.retain(|&x| x != 2), async { Ok(()) }).await;
        assert!(result.is_ok());
        assert_eq!(items, vec![1, 3]);
    }

    #[tokio::test]
    async fn failure_restores_the_previous_state() {
        let mut items = vec![1, 2, 3];
        let result: Result<(), &str> =
            execute(&mut items, |v| v.push(4), async { Err("offline") }).await;
        assert_eq!(result, Err("offline"));
        assert_eq!(items, vec![1, 2, 3]);
    }
}
