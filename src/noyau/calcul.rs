// src/noyau/calcul.rs
//
// API publique
// ------------
// texte -> prétraitement -> jetons -> arbre -> évaluation exacte (+ démarche)
//
// - Calculatrice : tables + options (valeur immuable, Send + Sync)
// - Resultat     : valeur exacte, démarche, lecture décimale
// - calculer_avec_delai : superviseur externe (fil de calcul abandonné au délai)

use std::fmt;
use std::sync::{mpsc, Arc, LazyLock};
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use num_rational::BigRational;

use super::config::{Options, Tables};
use super::erreurs::{Erreur, ErreurConfig, GenreErreur, Plage};
use super::eval::{evaluer, Evaluation};
use super::fonctions::Refus;
use super::format::format_valeur;
use super::jetons::FluxJetons;
use super::lecture::en_decimal;
use super::lexique::tokenize;
use super::pretraitement::{pretraiter, Pretraitement};
use super::syntaxe::parse;
use super::terme::Valeur;

/* ------------------------ Calculatrice ------------------------ */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Calculatrice {
    tables: Tables,
    options: Options,
}

impl Calculatrice {
    /// Tables vérifiées (formes canoniques connues, alias non vides).
    pub fn nouvelle(tables: Tables) -> Result<Self, ErreurConfig> {
        tables.valider()?;
        Ok(Self {
            tables,
            options: Options::default(),
        })
    }

    pub fn avec_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn calculer(&self, expression: &str) -> Result<Resultat, Erreur> {
        let pre = pretraiter(expression, &self.tables)?;

        // erreurs du lexique : ramenées sur l’expression saisie
        let flux = tokenize(&pre.texte, &self.tables).map_err(|e| {
            let plages = e.plages.iter().map(|p| pre.vers_origine(*p)).collect();
            e.avec_expression(&pre.source, plages)
        })?;
        debug!("jetons : {}", flux.texte);

        let arbre = parse(&flux)?;
        debug!("arbre : {arbre}");

        let evaluation = evaluer(arbre, &flux, &self.tables)?;
        Ok(Resultat {
            pretraitement: pre,
            flux,
            evaluation,
            decimales: self.options.decimales,
        })
    }
}

static DEFAUT: LazyLock<Calculatrice> = LazyLock::new(Calculatrice::default);

/// Calcul avec les tables et options par défaut.
pub fn calculer(expression: &str) -> Result<Resultat, Erreur> {
    DEFAUT.calculer(expression)
}

/// Pile du fil de calcul supervisé.
const PILE_CALCUL: usize = 32 * 1024 * 1024;

/// Calcule sur un fil dédié ; au-delà de `delai`, le calcul est abandonné
/// et l’erreur `Delai` couvre toute l’expression.
pub fn calculer_avec_delai(
    calculatrice: Arc<Calculatrice>,
    expression: &str,
    delai: Duration,
) -> Result<Resultat, Erreur> {
    let (tx, rx) = mpsc::channel();
    let texte = expression.to_string();
    let travailleur = Arc::clone(&calculatrice);
    let fil = thread::Builder::new()
        .name("calcul".into())
        .stack_size(PILE_CALCUL)
        .spawn(move || {
            let _ = tx.send(travailleur.calculer(&texte));
        });
    if let Err(e) = fil {
        warn!("fil de calcul indisponible ({e}) : calcul sans délai");
        return calculatrice.calculer(expression);
    }

    match rx.recv_timeout(delai) {
        Ok(r) => r,
        Err(_) => {
            warn!("délai dépassé ({delai:?}) : {expression:?}");
            Err(Erreur::new(
                GenreErreur::Delai {
                    limite_ms: delai.as_millis(),
                },
                expression,
                vec![Plage::new(0, expression.chars().count())],
            ))
        }
    }
}

/* ------------------------ Résultat ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resultat {
    pretraitement: Pretraitement,
    flux: FluxJetons,
    evaluation: Evaluation,
    decimales: usize,
}

impl Resultat {
    /// Expression telle que saisie.
    pub fn expression(&self) -> &str {
        &self.pretraitement.source
    }

    pub fn normalisee(&self) -> &str {
        &self.pretraitement.texte
    }

    /// Flux évalué (multiplications explicitées, littéraux fractionnés).
    pub fn flux(&self) -> &FluxJetons {
        &self.flux
    }

    pub fn flux_final(&self) -> &FluxJetons {
        &self.evaluation.flux_final
    }

    pub fn valeur(&self) -> &Valeur {
        &self.evaluation.valeur
    }

    pub fn texte(&self) -> String {
        format_valeur(&self.evaluation.valeur)
    }

    pub fn etapes(&self) -> &[String] {
        &self.evaluation.etapes
    }

    /// Some si la valeur est rationnelle.
    pub fn fraction(&self) -> Option<BigRational> {
        self.evaluation.valeur.en_rationnel()
    }

    /// Lecture décimale tronquée ; un paramètre de groupe (`(…)12?`) l’emporte sur les options.
    pub fn en_decimal(&self) -> Result<String, Erreur> {
        let places = self.evaluation.conversions.decimales.unwrap_or(self.decimales);
        self.en_decimal_avec(places)
    }

    pub fn en_decimal_avec(&self, places: usize) -> Result<String, Erreur> {
        en_decimal(&self.evaluation.valeur, &self.evaluation.conversions, places).map_err(|r| {
            let genre = match r {
                Refus::Conversion(symbole) => GenreErreur::Conversion { symbole },
                Refus::Domaine(raison) => GenreErreur::Domaine {
                    fonction: "lecture".to_string(),
                    raison,
                },
                Refus::DivisionParZero => GenreErreur::DivisionParZero {
                    unite: self.texte(),
                },
            };
            let texte = &self.evaluation.flux_final.texte;
            Erreur::new(genre, texte, vec![Plage::new(0, texte.chars().count())])
        })
    }
}

impl fmt::Display for Resultat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.texte())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::erreurs::ProblemeParenthese;
    use pretty_assertions::assert_eq;

    fn texte(s: &str) -> String {
        calculer(s)
            .unwrap_or_else(|e| panic!("{s:?} : {e}"))
            .to_string()
    }

    #[test]
    fn scenarios_de_base() {
        assert_eq!(texte("1+1"), "2");
        assert_eq!(texte("-1/2+1/3"), "-1/6");
        assert_eq!(texte("3x/6xy"), "1/2y");
        assert_eq!(texte("2.3..."), "7/3");
    }

    #[test]
    fn erreurs_portees_sur_la_saisie() {
        let e = calculer("5/0").unwrap_err();
        assert!(matches!(e.genre, GenreErreur::DivisionParZero { .. }));
        assert_eq!(e.extrait().as_deref(), Some("5/0"));

        let e = calculer("3 + (3/4+[5/6])").unwrap_err();
        assert!(matches!(
            e.genre,
            GenreErreur::Parenthese {
                probleme: ProblemeParenthese::Hierarchie,
                ..
            }
        ));
        assert_eq!(e.expression, "3 + (3/4+[5/6])");
    }

    #[test]
    fn lecture_decimale() {
        let r = calculer("1/3").unwrap();
        assert_eq!(r.en_decimal().unwrap(), "0.3333333");
        assert_eq!(r.en_decimal_avec(2).unwrap(), "0.33");
        assert_eq!(calculer("(π)3?").unwrap().en_decimal().unwrap(), "3.141");
        assert!(matches!(
            calculer("x+1").unwrap().en_decimal().unwrap_err().genre,
            GenreErreur::Conversion { .. }
        ));
        assert_eq!(calculer("x2?+1").unwrap().en_decimal().unwrap(), "3.0000000");
    }

    #[test]
    fn options_et_tables() {
        let c = Calculatrice::default().avec_options(Options { decimales: 3 });
        assert_eq!(c.calculer("2/3").unwrap().en_decimal().unwrap(), "0.666");

        let mut tables = Tables::default();
        tables.fonctions.push(("sinus".to_string(), vec!["sinus".to_string()]));
        assert!(matches!(
            Calculatrice::nouvelle(tables),
            Err(ErreurConfig::FonctionInconnue(_))
        ));
    }

    #[test]
    fn resultat_complet() {
        let r = calculer("1/2 + 1/2 =").unwrap();
        assert_eq!(r.expression(), "1/2 + 1/2 =");
        assert_eq!(r.normalisee(), "1/2+1/2");
        assert_eq!(r.fraction(), Some(BigRational::from_integer(1.into())));
        assert_eq!(r.etapes().last().map(String::as_str), Some("1"));
        assert_eq!(r.flux_final().texte, "1");
    }

    #[test]
    fn delai() {
        let c = Arc::new(Calculatrice::default());
        let r = calculer_avec_delai(c.clone(), "2+2", Duration::from_secs(10)).unwrap();
        assert_eq!(r.texte(), "4");

        let e = calculer_avec_delai(c, "fact(2000)^200", Duration::from_nanos(1)).unwrap_err();
        assert!(matches!(e.genre, GenreErreur::Delai { .. }));
        assert_eq!(e.plages, vec![Plage::new(0, 14)]);
    }

    #[test]
    fn longues_expressions_sous_delai() {
        let c = Arc::new(Calculatrice::default());
        let somme = vec!["1"; 2000].join("+");
        let r = calculer_avec_delai(c.clone(), &somme, Duration::from_secs(60)).unwrap();
        assert_eq!(r.texte(), "2000");

        let profond = format!("{}2{}", "(".repeat(3000), ")".repeat(3000));
        let e = calculer_avec_delai(c, &profond, Duration::from_secs(60)).unwrap_err();
        assert!(matches!(e.genre, GenreErreur::Profondeur { .. }));
    }

    #[test]
    fn longue_somme_sur_le_fil_courant() {
        let somme = vec!["1/2"; 600].join("+");
        assert_eq!(texte(&somme), "300");
        let produit = vec!["2"; 200].join("*");
        assert_eq!(texte(&produit), format!("{}", num_bigint::BigInt::from(2).pow(200)));
    }

    #[test]
    fn calculatrice_partageable() {
        fn partageable<T: Send + Sync>() {}
        partageable::<Calculatrice>();
        partageable::<Resultat>();
    }
}
