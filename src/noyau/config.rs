// src/noyau/config.rs
//
// Configuration injectée (immuable)
// --------------------------------
// - Tables : correspondances symboles + fonctions (ordre significatif)
// - Options : décimales retenues pour la conversion numérique
//
// Les tables sont une VALEUR : reconfigurer = construire une nouvelle
// Calculatrice. Aucune table globale mutable.

use serde::{Deserialize, Serialize};

use super::erreurs::ErreurConfig;
use super::fonctions::Fonction;

/// Décimales retenues par défaut (lecture décimale).
pub const DECIMALES_DEFAUT: usize = 7;

/// Paire (forme canonique, [alias...]) ; appliquée de haut en bas puis de gauche à droite.
pub type Correspondance = (String, Vec<String>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tables {
    pub symboles: Vec<Correspondance>,
    pub fonctions: Vec<Correspondance>,
}

fn paire(canon: &str, alias: &[&str]) -> Correspondance {
    (
        canon.to_string(),
        alias.iter().map(|a| a.to_string()).collect(),
    )
}

impl Default for Tables {
    fn default() -> Self {
        let symboles = vec![
            paire("", &[" ", "\t"]),
            paire("*", &["×", "·", "times"]),
            paire("/", &["÷", "over"]),
            paire("^", &["**"]),
            paire("+", &["plus"]),
            paire("-", &["minus", "−"]),
            paire("°", &["deg"]),
            paire("π", &["pi", "PI", "Pi"]),
            paire("𝑒", &["e"]),
            paire("√", &["√"]),
        ];

        let fonctions = vec![
            paire("pow", &["pow", "power"]),
            paire("sqrt", &["sqrt"]),
            paire("sq", &["sq"]),
            paire("cub", &["cub"]),
            paire("rec", &["rec"]),
            paire("mod", &["mod"]),
            paire("fact", &["fact", "factorial"]),
            paire("abs", &["abs", "absolute"]),
            paire("sign", &["sign", "sgn"]),
            paire("gcd", &["gcd"]),
            paire("lcm", &["lcm"]),
            paire("asin", &["asin", "arcsin"]),
            paire("acos", &["acos", "arccos"]),
            paire("atan", &["atan", "arctan"]),
            paire("sin", &["sin", "SIN", "Sin"]),
            paire("cos", &["cos", "COS", "Cos"]),
            paire("tan", &["tan", "TAN", "Tan"]),
            paire("log", &["log"]),
            paire("ln", &["ln"]),
            paire("lg", &["lg"]),
            paire("exp", &["exp"]),
        ];

        Self {
            symboles,
            fonctions,
        }
    }
}

impl Tables {
    /// Lit des tables depuis un document JSON :
    /// `{"symboles": [["*", ["×"]], ...], "fonctions": [["sin", ["sin"]], ...]}`
    pub fn depuis_json(json: &str) -> Result<Self, ErreurConfig> {
        let tables: Tables = serde_json::from_str(json)?;
        tables.valider()?;
        Ok(tables)
    }

    /// Les noms canoniques de fonctions servent de clés d’arité/domaine : ils doivent exister.
    pub fn valider(&self) -> Result<(), ErreurConfig> {
        for (canon, alias) in &self.fonctions {
            if Fonction::depuis_nom(canon).is_none() {
                return Err(ErreurConfig::FonctionInconnue(canon.clone()));
            }
            if alias.iter().any(|a| a.is_empty()) {
                return Err(ErreurConfig::AliasVide(canon.clone()));
            }
        }
        for (canon, alias) in &self.symboles {
            if alias.iter().any(|a| a.is_empty()) {
                return Err(ErreurConfig::AliasVide(canon.clone()));
            }
        }
        Ok(())
    }

    /// Noms canoniques des fonctions (clés de recherche).
    pub fn noms_fonctions(&self) -> Vec<String> {
        self.fonctions.iter().map(|(c, _)| c.clone()).collect()
    }

    /// Tous les noms à protéger de la substitution de symboles : canoniques + alias.
    pub fn noms_proteges(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for (canon, alias) in &self.fonctions {
            out.push(canon.clone());
            out.extend(alias.iter().cloned());
        }
        out.sort();
        out.dedup();
        out
    }

    /// Caractères canoniques de la table des symboles : interdits comme irrationnel court.
    pub fn symboles_reserves(&self) -> Vec<char> {
        let mut out: Vec<char> = self
            .symboles
            .iter()
            .flat_map(|(canon, _)| canon.chars())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Décimales retenues par la conversion numérique.
    pub decimales: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            decimales: DECIMALES_DEFAUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_par_defaut_valides() {
        let t = Tables::default();
        assert!(t.valider().is_ok());
        assert!(t.noms_fonctions().contains(&"sin".to_string()));
        assert!(t.noms_proteges().contains(&"arcsin".to_string()));
        assert!(t.symboles_reserves().contains(&'π'));
    }

    #[test]
    fn json_aller_retour() {
        let t = Tables::default();
        let json = serde_json::to_string(&t).unwrap();
        let relu = Tables::depuis_json(&json).unwrap();
        assert_eq!(t, relu);
    }

    #[test]
    fn json_fonction_inconnue_refusee() {
        let json = r#"{"symboles": [], "fonctions": [["sinh", ["sinh"]]]}"#;
        let err = Tables::depuis_json(json).unwrap_err();
        assert!(matches!(err, ErreurConfig::FonctionInconnue(ref n) if n == "sinh"));
    }

    #[test]
    fn json_malforme_refuse() {
        assert!(matches!(
            Tables::depuis_json("{pas du json"),
            Err(ErreurConfig::Json(_))
        ));
    }
}
