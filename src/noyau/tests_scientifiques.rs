//! Tests scientifiques (campagne) : invariants + robustesse + limites contrôlées.
//!
//! But : trouver les limites sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (profondeur, longueur)
//! - décimales limitées pour la lecture décimale
//!
//! Notes :
//! - Les angles spéciaux sont reconnus sur kπ/n (n ∈ {1,2,3,4,6}), réduits modulo 2π.
//! - L’annulation structurelle (√3/3 - 1/√3 = 0, x - x = 0) est faite par la
//!   forme canonique des monômes.
//! - Les erreurs portent sur le texte évalué : on vérifie genre + extrait.

use std::time::{Duration, Instant};

use super::calcul::calculer;
use super::erreurs::{Erreur, GenreErreur, ProblemeParenthese};

fn texte_ok(expr: &str) -> String {
    calculer(expr)
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
        .texte()
}

fn erreur(expr: &str) -> Erreur {
    match calculer(expr) {
        Ok(r) => panic!("expr={expr:?} : erreur attendue, obtenu {r}"),
        Err(e) => e,
    }
}

fn assert_exact_eq(expr: &str, attendu: &str) {
    assert_eq!(texte_ok(expr), attendu, "expr={expr:?}");
}

fn assert_domaine(expr: &str) {
    let e = erreur(expr);
    assert!(
        matches!(e.genre, GenreErreur::Domaine { .. }),
        "expr={expr:?} genre={:?}",
        e.genre
    );
}

fn assert_decimal(expr: &str, places: usize, attendu: &str) {
    let r = calculer(expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
    let lu = r
        .en_decimal_avec(places)
        .unwrap_or_else(|e| panic!("expr={expr:?} lecture err={e}"));
    assert_eq!(lu, attendu, "expr={expr:?}");
}

/// Budget global anti-gel (scientifique + safe).
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Scénarios de référence ------------------------ */

#[test]
fn sci_scenarios_de_reference() {
    assert_exact_eq("1+1", "2");
    assert_exact_eq("-1/2+1/3", "-1/6");
    assert_exact_eq("3x/6xy", "1/2y");
    assert_exact_eq("2.3...", "7/3");

    let e = erreur("5/0");
    assert!(matches!(e.genre, GenreErreur::DivisionParZero { .. }));
    assert_eq!(e.extrait().as_deref(), Some("5/0"));

    let e = erreur("3+(3/4+[5/6])");
    assert!(matches!(
        e.genre,
        GenreErreur::Parenthese {
            probleme: ProblemeParenthese::Hierarchie,
            ..
        }
    ));
}

/* ------------------------ Littéraux ------------------------ */

#[test]
fn sci_litteraux() {
    assert_exact_eq("0.1666...", "1/6");
    assert_exact_eq("0.142857...", "1/7");
    assert_exact_eq("50%", "1/2");
    assert_exact_eq("1_1/2", "3/2");
    assert_exact_eq("2.50", "5/2");
    assert_exact_eq("7%3", "1");
}

/* ------------------------ Invariants trig (angles spéciaux) ------------------------ */

#[test]
fn sci_indefinis_tan() {
    assert_domaine("tan(π/2)");
    assert_domaine("tan(3π/2)");
    assert_domaine("tan(-π/2)");
}

#[test]
fn sci_identites_symetrie() {
    // sin(-x) = -sin(x)
    assert_exact_eq("sin(-π/4)", "-√2/2");
    assert_exact_eq("sin(π/4)", "√2/2");

    // cos(-x) = cos(x)
    assert_exact_eq("cos(-π/3)", "1/2");
    assert_exact_eq("cos(π/3)", "1/2");

    // tan(-x) = -tan(x) (hors indéfini)
    assert_exact_eq("tan(-π/6)", "-√3/3");
    assert_exact_eq("tan(π/6)", "√3/3");
}

#[test]
fn sci_periodicite_angles() {
    assert_exact_eq("sin(9π/4)", "√2/2");
    assert_exact_eq("cos(7π/3)", "1/2");
    assert_exact_eq("tan(7π/6)", "√3/3");
    // la somme est réduite avant l’appel
    assert_exact_eq("sin(π/4+2π)", "√2/2");
    assert_exact_eq("cos(60°)", "1/2");
}

#[test]
fn sci_reciproques() {
    assert_exact_eq("asin(1/2)", "π/6");
    assert_exact_eq("acos(0)", "π/2");
    assert_exact_eq("atan(1)", "π/4");
    assert_domaine("asin(2)");
}

#[test]
fn sci_propagation_domaine() {
    // une erreur de domaine interrompt tout le calcul
    assert_domaine("1 + tan(π/2)");
    assert_domaine("tan(π/2) + 1");
    assert_domaine("2 * tan(π/2)");
    assert_domaine("tan(π/2) / 3");
}

/* ------------------------ Cohérence algébrique (zéro) ------------------------ */

#[test]
fn sci_zero_algebrique() {
    assert_exact_eq("(1/2 + 1/3) - 5/6", "0");
    assert_exact_eq("(2/3 * 3/4) - 1/2", "0");
    assert_exact_eq("sqrt(2)*sqrt(2) - 2", "0");
    assert_exact_eq("1/sqrt(3)", "√3/3");
    assert_exact_eq("sqrt(3)/3 - 1/sqrt(3)", "0");
    assert_exact_eq("x - x", "0");
    assert_exact_eq("(x+1)/(x+1)", "1");
}

#[test]
fn sci_symbolique() {
    assert_exact_eq("√8", "2√2");
    assert_exact_eq("√2√3", "√6");
    assert_exact_eq("2π-π", "π");
    assert_exact_eq("(x+1)^2", "x^2+2x+1");
    assert_exact_eq("ln(𝑒^3)", "3");
    assert_exact_eq("log(2,8)", "3");
    assert_exact_eq("sin(1)", "sin(1)");
}

#[test]
fn sci_facteurs_communs() {
    // un facteur présent en haut et en bas s’annule, même développé
    assert_exact_eq("(x+y)^2/(x+y)", "x+y");
    assert_exact_eq("(x+y)/(x+y)^2", "1/(x+y)");
    assert_exact_eq("(x^2-1)/(x-1)", "x+1");
    assert_exact_eq("(x+1)^3/(x+1)^2", "x+1");
    assert_exact_eq("(2x+2)/(x+1)", "2");
    // sans facteur commun, le quotient reste lisible
    assert_exact_eq("x/(x+1)", "x/(x+1)");
}

#[test]
fn sci_racines_retenues() {
    assert_exact_eq("√x*√x", "x");
    let cube = texte_ok("(√x)^3");
    assert!(!cube.contains('^'), "cube={cube:?}");
    assert_exact_eq("√(x+1)*√(x+1)-x", "1");
}

#[test]
fn sci_ordre_naturel() {
    assert_exact_eq("y+x", "x+y");
    assert_exact_eq("(x+y)^2", "x^2+2xy+y^2");
    assert_exact_eq("(x+y)*2", "2x+2y");
}

#[test]
fn sci_fraction_mixte_signee() {
    assert_exact_eq("1_-1/2", "1/2");
    assert_exact_eq("3_1/4", "13/4");
    assert_exact_eq("2*1_-3/2", "-1");
}

/* ------------------------ Fonctions entières ------------------------ */

#[test]
fn sci_fonctions_entieres() {
    assert_exact_eq("fact(5)", "120");
    assert_exact_eq("5!", "120");
    assert_exact_eq("gcd(12,18)", "6");
    assert_exact_eq("lcm(4,6)", "12");
    assert_exact_eq("mod(-7,3)", "2");
    assert_exact_eq("fact(x3?)", "6");
    assert!(matches!(
        erreur("fact(x)").genre,
        GenreErreur::Conversion { .. }
    ));
    assert_domaine("fact(1/2)");
}

/* ------------------------ Démarche ------------------------ */

#[test]
fn sci_demarche_deterministe() {
    let a = calculer("(1+2)*(3+4)-5").unwrap();
    let b = calculer("(1+2)*(3+4)-5").unwrap();
    assert_eq!(a.etapes(), b.etapes());
    assert_eq!(a.etapes(), ["3*(3+4)-5", "3*7-5", "21-5", "16"]);
    assert_eq!(a.etapes().last().map(String::as_str), Some("16"));
}

#[test]
fn sci_demarche_relisible() {
    // chaque entrée se relit avec la même valeur finale
    for expr in ["2x+3x", "√12/2", "(1+x)^2-x^2", "2^-1+1/2"] {
        let r = calculer(expr).unwrap();
        for etape in r.etapes() {
            assert_eq!(texte_ok(etape), r.texte(), "expr={expr:?} etape={etape:?}");
        }
    }
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_profondeur_sqrt_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    // alternance √ / carré : reste rationnel (4 -> 2 -> 4 ...)
    let mut expr = "4".to_string();
    for k in 0..60 {
        expr = if k % 2 == 0 {
            format!("sqrt({expr})")
        } else {
            format!("({expr})^2")
        };
        budget(t0, max);
    }

    assert_exact_eq(&expr, "4");
}

#[test]
fn sci_stress_taille_somme_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let mut expr = String::new();
    for k in 0..80 {
        if k > 0 {
            expr.push_str(" + ");
        }
        expr.push_str("1/2");
        budget(t0, max);
    }

    // 80*(1/2)=40
    assert_exact_eq(&expr, "40");
}

#[test]
fn sci_stress_bigint_safe() {
    // gros numérateur contrôlé (100 chiffres)
    let big = "9".repeat(100);
    let expr = format!("{big}/7 + 1/7");
    let attendu = format!("1{}/7", "0".repeat(100));
    assert_exact_eq(&expr, &attendu);
}

/* ------------------------ Lecture décimale : cohérence minimale ------------------------ */

#[test]
fn sci_lecture_coherence_basic() {
    assert_decimal("sin(π/4)", 10, "0.7071067811");
    assert_decimal("π", 10, "3.1415926535");
    assert_decimal("-1/6", 4, "-0.1666");
    assert_decimal("√2", 8, "1.41421356");

    // un paramètre natif tronque π avant le calcul
    assert_decimal("2π2?", 5, "6.28000");

    // irrationnel personnalisé sans valeur : pas de lecture
    let r = calculer("x+1").unwrap();
    assert!(matches!(
        r.en_decimal().unwrap_err().genre,
        GenreErreur::Conversion { .. }
    ));
}
