//! The grounding prompt.

/// The only sentence the model may answer with when the context lacks the answer.
pub const REFUSAL: &str = "Não tenho informações necessárias para responder sua pergunta.";

/// Render the grounding prompt with its context and question slots filled.
///
/// Rules come first, then one answerable and three unanswerable worked
/// examples, then the user question. Every refusal in the template is
/// [`REFUSAL`] verbatim.
pub fn render_prompt(contexto: &str, pergunta: &str) -> String {
    format!(
        r#"
CONTEXTO:
{contexto}

REGRAS:
- Responda somente com base no CONTEXTO.
- Se a informação não estiver explicitamente no CONTEXTO, responda:
  "{REFUSAL}"
- Nunca invente ou use conhecimento externo.
- Nunca produza opiniões ou interpretações além do que está escrito.

EXEMPLO DE PERGUNTA DENTRO DO CONTEXTO:
Contexto de exemplo: "O prazo de entrega padrão é de 15 dias úteis."
Pergunta: "Qual é o prazo de entrega?"
Resposta: "O prazo de entrega padrão é de 15 dias úteis."

EXEMPLOS DE PERGUNTAS FORA DO CONTEXTO:
Pergunta: "Qual é a capital da França?"
Resposta: "{REFUSAL}"

Pergunta: "Quantos clientes temos em 2024?"
Resposta: "{REFUSAL}"

Pergunta: "Você acha isso bom ou ruim?"
Resposta: "{REFUSAL}"

PERGUNTA DO USUÁRIO:
{pergunta}

RESPONDA A "PERGUNTA DO USUÁRIO"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_filled_once_and_in_order() {
        let prompt = render_prompt("O faturamento foi de 10 milhões.", "Qual o faturamento?");
        let context_at = prompt.find("O faturamento foi de 10 milhões.").unwrap();
        let question_at = prompt.find("Qual o faturamento?").unwrap();
        assert!(context_at < prompt.find("REGRAS:").unwrap());
        assert!(question_at > prompt.find("PERGUNTA DO USUÁRIO:").unwrap());
        assert!(!prompt.contains("{contexto}"));
        assert!(!prompt.contains("{pergunta}"));
    }

    #[test]
    fn refusal_appears_verbatim_in_rule_and_examples() {
        let prompt = render_prompt("", "");
        assert_eq!(prompt.matches(REFUSAL).count(), 4);
    }

    #[test]
    fn braces_in_user_text_are_not_reinterpreted() {
        let prompt = render_prompt("valor {pergunta}", "o que é {contexto}?");
        assert!(prompt.contains("valor {pergunta}"));
        assert!(prompt.contains("o que é {contexto}?"));
    }
}
