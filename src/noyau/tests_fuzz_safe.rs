//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - on accepte certaines erreurs attendues (division par zéro, domaine)
//! - invariants clés : flux = concaténation des jetons, fraction irréductible,
//!   valeur finale relisible à l’identique

use std::time::{Duration, Instant};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};
use proptest::prelude::*;

use super::calcul::calculer;
use super::canon::pgcd;
use super::config::Tables;
use super::erreurs::{Erreur, GenreErreur, Plage};
use super::jetons::{FluxJetons, TypeJeton};
use super::lexique::tokenize;
use super::pretraitement::pretraiter;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn est_erreur_attendue(e: &Erreur) -> bool {
    // domaine volontairement limité : tan(π/2), 0/0...
    matches!(
        e.genre,
        GenreErreur::DivisionParZero { .. } | GenreErreur::Domaine { .. }
    )
}

fn verifier_fraction(r: &BigRational) {
    assert!(r.denom().is_positive(), "dénominateur ≤ 0 : {r}");
    assert!(
        pgcd(&r.numer().abs(), r.denom()).is_one(),
        "fraction non irréductible : {r}"
    );
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_rat(rng: &mut Rng) -> String {
    // rationnels simples, incluant 0 (utile pour tester zéros)
    let a = rng.pick(8);
    // la division par zéro doit arriver via `/ expr`
    let b = 1 + rng.pick(8);

    if rng.coin() {
        format!("{a}/{b}")
    } else {
        format!("{a}")
    }
}

fn gen_coeff_pi(rng: &mut Rng) -> String {
    // coeffs raisonnables, pour rester dans le domaine des angles spéciaux
    let k = rng.pick(14) as i32 - 6;
    let d = [1, 2, 3, 4, 6, 12][rng.pick(6) as usize];

    if d == 1 {
        format!("{k}π")
    } else {
        format!("{k}π/{d}")
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(7) {
        0 | 1 => gen_rat(rng),
        2 => "π".to_string(),
        3 => format!("({})", gen_coeff_pi(rng)),
        4 => "x".to_string(),
        5 => "√2".to_string(),
        _ => "sqrt(3)".to_string(),
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    match rng.pick(10) {
        0 => gen_atom(rng),
        1 => format!(
            "({}+{})",
            gen_expr(rng, depth - 1),
            gen_expr(rng, depth - 1)
        ),
        2 => format!(
            "({}-{})",
            gen_expr(rng, depth - 1),
            gen_expr(rng, depth - 1)
        ),
        3 => format!(
            "({}*{})",
            gen_expr(rng, depth - 1),
            gen_expr(rng, depth - 1)
        ),
        4 => format!(
            "({}/{})",
            gen_expr(rng, depth - 1),
            gen_expr(rng, depth - 1)
        ),
        5 => format!("sin({})", gen_coeff_pi(rng)), // angle contrôlé
        6 => format!("cos({})", gen_coeff_pi(rng)),
        7 => format!("tan({})", gen_coeff_pi(rng)),
        8 => format!("({})^{}", gen_expr(rng, depth - 1), rng.pick(4)),
        _ => format!("abs({})", gen_expr(rng, depth - 1)),
    }
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_determinisme_et_invariants() {
    let t0 = Instant::now();
    let max = Duration::from_secs(20);

    // Même seed => mêmes expressions => mêmes sorties (déterminisme)
    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..120 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);

        match calculer(&expr) {
            Ok(r) => {
                let bis = calculer(&expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
                assert_eq!(r.etapes(), bis.etapes(), "expr={expr:?}");
                assert_eq!(r.valeur(), bis.valeur(), "expr={expr:?}");

                if let Some(f) = r.fraction() {
                    verifier_fraction(&f);
                }

                // la valeur finale se relit à l’identique
                let relu = calculer(&r.texte())
                    .unwrap_or_else(|e| panic!("relecture {:?} err={e}", r.texte()));
                assert_eq!(relu.valeur(), r.valeur(), "expr={expr:?}");
                seen_ok += 1;
            }
            Err(e) => {
                assert!(
                    est_erreur_attendue(&e),
                    "erreur non attendue: expr={expr:?} err={e}"
                );
                assert!(!e.plages.is_empty());
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 10, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_angles_trig_dans_domaine() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..80 {
        budget(t0, max);

        let a = gen_coeff_pi(&mut rng);
        let expr = format!("sin({a})");

        // sin est défini partout : jamais d’erreur, valeur toujours lisible
        let r = calculer(&expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
        let lu = r
            .en_decimal_avec(6)
            .unwrap_or_else(|e| panic!("expr={expr:?} lecture err={e}"));
        assert!(!lu.is_empty());
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(10);

    let expr = somme_balancee("1/2", 800);
    budget(t0, max);

    let r = calculer(&expr).unwrap_or_else(|e| panic!("err: {e}"));

    // 800*(1/2) = 400
    assert_eq!(r.texte(), "400");
    budget(t0, max);
}

#[test]
fn fuzz_safe_idempotence_pretraitement_et_lexique() {
    let tables = Tables::default();
    let mut rng = Rng::new(0x5EED_u64);

    for _ in 0..60 {
        // espaces et alias : la forme normalisée diffère de la saisie
        let expr = gen_expr(&mut rng, 3)
            .replace('+', " + ")
            .replace('*', "×")
            .replace("abs(", "absolute(");
        let pre = pretraiter(&expr, &tables).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
        let bis = pretraiter(&pre.texte, &tables).unwrap_or_else(|e| panic!("err={e}"));
        assert_eq!(bis.texte, pre.texte, "expr={expr:?}");

        // même flux (jetons, plages, origines) depuis la saisie ou sa forme normalisée
        let flux = tokenize(&pre.texte, &tables).unwrap_or_else(|e| panic!("err={e}"));
        let flux_bis = tokenize(&bis.texte, &tables).unwrap_or_else(|e| panic!("err={e}"));
        assert_eq!(flux_bis, flux, "expr={expr:?}");

        // relu une seconde fois, le flux garde ses jetons ; seules les
        // multiplications élidées deviennent écrites
        let relu = tokenize(&flux.texte, &tables).unwrap_or_else(|e| panic!("err={e}"));
        assert_eq!(relu.texte, flux.texte, "expr={expr:?}");
        let forme = |f: &FluxJetons| -> Vec<(TypeJeton, String, Plage)> {
            f.iter().map(|j| (j.genre, j.valeur.clone(), j.plage)).collect()
        };
        assert_eq!(forme(&relu), forme(&flux), "expr={expr:?}");
    }
}

/* ------------------------ Propriétés (proptest) ------------------------ */

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_flux_aller_retour(expr in "[0-9x+*/()-]{1,24}") {
        if let Ok(flux) = tokenize(&expr, &Tables::default()) {
            let concat: String = flux.iter().map(|j| j.valeur.as_str()).collect();
            prop_assert_eq!(&concat, &flux.texte);
            let mut pos = 0;
            for j in flux.iter() {
                prop_assert_eq!(j.plage.debut, pos);
                prop_assert_eq!(j.plage.longueur(), j.valeur.chars().count());
                pos = j.plage.fin;
            }
        }
    }

    #[test]
    fn prop_quotient_en_fraction_irreductible(a in -10_000i64..10_000, b in 1i64..10_000) {
        let r = calculer(&format!("{a}/{b}")).unwrap();
        let f = r.fraction().unwrap();
        verifier_fraction(&f);
        prop_assert_eq!(f, BigRational::new(BigInt::from(a), BigInt::from(b)));
    }

    #[test]
    fn prop_erreurs_dans_l_expression(expr in "[0-9x+*/()-]{1,16}") {
        if let Err(e) = calculer(&expr) {
            let n = e.expression.chars().count();
            for p in &e.plages {
                prop_assert!(p.debut <= p.fin && p.fin <= n, "{:?} hors de {:?}", p, e.expression);
            }
        }
    }
}
