// src/noyau/canon.rs
//
// Canonicalisation forte (déterministe) d’un monôme :
// - exposants additionnés, zéros retirés
// - groupes à un seul terme dépliés, groupes multi-termes rendus primitifs
//   (dernier coefficient = 1, le reste remonte dans le coefficient)
// - racines : √n^k -> n^(k div 2)·√n^(k mod 2), puis √a·√b -> g·√(ab/g²)
// - √(n) -> s·√t (extraction des carrés parfaits) pour n entier ≥ 0
// - racine retenue √(a)^k, |k| ≥ 2 -> a^(k div 2)·√(a)^(k mod 2)
//
// Outils entiers exacts (pgcd, racines entières) partagés par les règles.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::fonctions::Fonction;
use super::terme::{Facteur, Monome, Valeur};

/// Borne des essais de division pour l’extraction des carrés.
const ESSAIS_MAX: u32 = 100_000;

/* ------------------------ Outils entiers ------------------------ */

pub fn pgcd(a: &BigInt, b: &BigInt) -> BigInt {
    let mut a = a.abs();
    let mut b = b.abs();
    while !b.is_zero() {
        let t = &a % &b;
        a = b;
        b = t;
    }
    a
}

pub fn ppcm(a: &BigInt, b: &BigInt) -> BigInt {
    if a.is_zero() || b.is_zero() {
        return BigInt::zero();
    }
    (a / pgcd(a, b) * b).abs()
}

pub fn puissance_rat(base: &BigRational, exp: i64) -> BigRational {
    if exp == 0 {
        return BigRational::one();
    }
    if exp < 0 {
        return BigRational::one() / puissance_rat(base, -exp);
    }

    let mut e = exp as u64;
    let mut acc = BigRational::one();
    let mut b = base.clone();

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }
    acc
}

/// a − b·⌊a/b⌋ (signe du diviseur), b ≠ 0.
pub fn reste_euclidien(a: &BigRational, b: &BigRational) -> BigRational {
    let q = (a / b).floor();
    a - b * q
}

/// Partie entière de la racine k-ième de x ≥ 0 (dichotomie sur les bits).
pub fn racine_entiere(x: &BigInt, k: u32) -> BigInt {
    if x.is_negative() || k == 0 {
        return BigInt::zero();
    }
    if x < &BigInt::from(2) || k == 1 {
        return x.clone();
    }
    let bits = x.bits() / u64::from(k) + 1;
    let mut bas = BigInt::zero();
    let mut haut = BigInt::one() << bits;
    while &bas < &haut {
        let milieu: BigInt = (&bas + &haut + 1u32) >> 1;
        if num_traits::pow(milieu.clone(), k as usize) <= *x {
            bas = milieu;
        } else {
            haut = milieu - 1u32;
        }
    }
    bas
}

pub fn racine_exacte(x: &BigInt, k: u32) -> Option<BigInt> {
    if x.is_negative() {
        return None;
    }
    let r = racine_entiere(x, k);
    (num_traits::pow(r.clone(), k as usize) == *x).then_some(r)
}

/// Racine k-ième exacte d’un rationnel (signe négatif accepté pour k impair).
pub fn racine_rationnelle_exacte(r: &BigRational, k: u32) -> Option<BigRational> {
    if r.is_negative() {
        if k % 2 == 0 {
            return None;
        }
        return racine_rationnelle_exacte(&-r, k).map(|x| -x);
    }
    let n = racine_exacte(r.numer(), k)?;
    let d = racine_exacte(r.denom(), k)?;
    Some(BigRational::new(n, d))
}

/// Décompose n >= 0 en n = s^2 * t, avec t sans facteur carré (essais bornés,
/// puis test de carré parfait sur le reste).
pub fn extrait_carre_parfait(n: &BigInt) -> (BigInt, BigInt) {
    if n.is_zero() {
        return (BigInt::zero(), BigInt::zero());
    }
    if n.is_one() {
        return (BigInt::one(), BigInt::one());
    }

    let mut reste = n.abs();
    let mut s = BigInt::one();

    let mut p = BigInt::from(2);
    let mut essais = 0u32;
    while &p * &p <= reste && essais < ESSAIS_MAX {
        let p2 = &p * &p;

        while (&reste % &p2).is_zero() {
            reste /= &p2;
            s *= &p;
        }
        if (&reste % &p).is_zero() {
            reste /= &p;
            // facteur simple : on le remet après la boucle
            let (s2, t2) = extrait_carre_parfait(&reste);
            return (s * s2, t2 * p);
        }

        if p == BigInt::from(2) {
            p = BigInt::from(3);
        } else {
            p += 2;
        }
        essais += 1;
    }

    if let Some(r) = racine_exacte(&reste, 2) {
        return (s * r, BigInt::one());
    }
    (s, reste)
}

/* ------------------------ Monômes ------------------------ */

/// Normalise `coef · Π facteur^exposant` en (coefficient, monôme canonique).
pub fn normaliser(
    coef: BigRational,
    facteurs: impl IntoIterator<Item = (Facteur, i64)>,
) -> (BigRational, Monome) {
    let mut coef = coef;
    let mut pile: Vec<(Facteur, i64)> = facteurs.into_iter().collect();
    let mut acc: BTreeMap<Facteur, i64> = BTreeMap::new();
    let mut racines: Vec<(BigInt, i64)> = Vec::new();

    while let Some((f, k)) = pile.pop() {
        if k == 0 {
            continue;
        }
        match f {
            Facteur::Racine(n) => racines.push((n, k)),
            Facteur::Groupe(v) => {
                if v.est_zero() {
                    coef = BigRational::zero();
                    continue;
                }
                if let Some((m, c)) = v.terme_unique() {
                    coef *= puissance_rat(c, k);
                    pile.extend(m.facteurs().map(|(g, e)| (g.clone(), e.saturating_mul(k))));
                    continue;
                }
                let (meneur, primitif) = v.primitif();
                coef *= puissance_rat(&meneur, k);
                *acc.entry(Facteur::Groupe(Box::new(primitif))).or_insert(0) += k;
            }
            autre => *acc.entry(autre).or_insert(0) += k,
        }
    }

    if coef.is_zero() {
        return (coef, Monome::default());
    }

    let mut radicande = BigInt::one();
    for (n, k) in racines {
        let q = k.div_euclid(2);
        let r = k.rem_euclid(2);
        coef *= puissance_rat(&BigRational::from_integer(n.clone()), q);
        if r == 1 {
            let g = pgcd(&radicande, &n);
            coef *= BigRational::from_integer(g.clone());
            radicande = (&radicande / &g) * (&n / &g);
        }
    }
    if !radicande.is_one() {
        acc.insert(Facteur::Racine(radicande), 1);
    }

    acc.retain(|_, e| *e != 0);
    if !acc
        .iter()
        .any(|(f, e)| e.abs() >= 2 && argument_de_racine(f).is_some())
    {
        return (coef, Monome::new(acc));
    }

    let mut facteurs: Vec<(Facteur, i64)> = Vec::with_capacity(acc.len() + 1);
    for (f, e) in acc {
        match argument_de_racine(&f).cloned() {
            Some(a) if e.abs() >= 2 => {
                facteurs.push((Facteur::Groupe(Box::new(a)), e.div_euclid(2)));
                if e.rem_euclid(2) == 1 {
                    facteurs.push((f, 1));
                }
            }
            _ => facteurs.push((f, e)),
        }
    }
    normaliser(coef, facteurs)
}

/// Argument d’un `√(…)` retenu.
fn argument_de_racine(f: &Facteur) -> Option<&Valeur> {
    match f {
        Facteur::Appel(Fonction::Sqrt, args) if args.len() == 1 => args.first(),
        _ => None,
    }
}

/// √r exact pour r ≥ 0 : r = a/b -> (s/b)·√t avec ab = s²t.
pub fn racine_de_rationnel(r: &BigRational) -> Valeur {
    if r.is_zero() {
        return Valeur::zero();
    }
    let produit = r.numer() * r.denom();
    let (s, t) = extrait_carre_parfait(&produit);
    let coef = BigRational::new(s, r.denom().clone());
    if t.is_one() {
        return Valeur::rationnel(coef);
    }
    Valeur::terme(coef, [(Facteur::Racine(t), 1)])
}

/// Petit entier (i64) si le rationnel en est un.
pub fn petit_entier(r: &BigRational) -> Option<i64> {
    if r.is_integer() {
        r.numer().to_i64()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bi(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn extraction_des_carres() {
        assert_eq!(extrait_carre_parfait(&bi(12)), (bi(2), bi(3)));
        assert_eq!(extrait_carre_parfait(&bi(75)), (bi(5), bi(3)));
        assert_eq!(extrait_carre_parfait(&bi(49)), (bi(7), bi(1)));
        assert_eq!(extrait_carre_parfait(&bi(18)), (bi(3), bi(2)));
        assert_eq!(extrait_carre_parfait(&bi(30)), (bi(1), bi(30)));
    }

    #[test]
    fn racines_entieres() {
        assert_eq!(racine_entiere(&bi(26), 2), bi(5));
        assert_eq!(racine_exacte(&bi(27), 3), Some(bi(3)));
        assert_eq!(racine_exacte(&bi(28), 3), None);
        let r = BigRational::new(bi(-8), bi(27));
        assert_eq!(
            racine_rationnelle_exacte(&r, 3),
            Some(BigRational::new(bi(-2), bi(3)))
        );
    }

    #[test]
    fn reste_du_signe_du_diviseur() {
        let r = |n, d| BigRational::new(bi(n), bi(d));
        assert_eq!(reste_euclidien(&r(7, 1), &r(3, 1)), r(1, 1));
        assert_eq!(reste_euclidien(&r(-7, 1), &r(3, 1)), r(2, 1));
        assert_eq!(reste_euclidien(&r(7, 1), &r(-3, 1)), r(-2, 1));
        assert_eq!(reste_euclidien(&r(-1, 2), &r(2, 1)), r(3, 2));
    }

    #[test]
    fn pgcd_ppcm() {
        assert_eq!(pgcd(&bi(12), &bi(-18)), bi(6));
        assert_eq!(ppcm(&bi(4), &bi(6)), bi(12));
        assert_eq!(ppcm(&bi(0), &bi(6)), bi(0));
    }

    #[test]
    fn racines_combinees() {
        // √2·√6 = 2√3
        let (c, m) = normaliser(
            BigRational::one(),
            [(Facteur::Racine(bi(2)), 1), (Facteur::Racine(bi(6)), 1)],
        );
        assert_eq!(c, BigRational::from_integer(bi(2)));
        assert_eq!(m, Monome::new(BTreeMap::from([(Facteur::Racine(bi(3)), 1)])));

        // 1/√2 = √2/2
        let (c, m) = normaliser(BigRational::one(), [(Facteur::Racine(bi(2)), -1)]);
        assert_eq!(c, BigRational::new(bi(1), bi(2)));
        assert_eq!(m, Monome::new(BTreeMap::from([(Facteur::Racine(bi(2)), 1)])));
    }

    #[test]
    fn racine_retenue_au_carre() {
        let x = Valeur::symbole(crate::noyau::terme::Symbole::Court('x'));
        let rx = Facteur::Appel(Fonction::Sqrt, vec![x.clone()]);
        // √(x)·√(x) = x
        let (c, m) = normaliser(BigRational::one(), [(rx.clone(), 1), (rx.clone(), 1)]);
        assert_eq!(c, BigRational::one());
        assert_eq!(Valeur::terme(c, m.facteurs().map(|(f, e)| (f.clone(), *e))), x);
        // √(x)^3 = x·√(x)
        let (_, m) = normaliser(BigRational::one(), [(rx.clone(), 3)]);
        assert_eq!(m.exposant(&rx), 1);
        assert_eq!(m.exposant(&Facteur::Symbole(crate::noyau::terme::Symbole::Court('x'))), 1);
        // √(x)^-2 = 1/x
        let (_, m) = normaliser(BigRational::one(), [(rx.clone(), -2)]);
        assert_eq!(m.exposant(&rx), 0);
        assert_eq!(m.exposant(&Facteur::Symbole(crate::noyau::terme::Symbole::Court('x'))), -1);
    }

    #[test]
    fn racine_de_fraction() {
        // √(1/2) = √2/2
        let v = racine_de_rationnel(&BigRational::new(bi(1), bi(2)));
        let (m, c) = v.terme_unique().unwrap();
        assert_eq!(c, &BigRational::new(bi(1), bi(2)));
        assert_eq!(m, &Monome::new(BTreeMap::from([(Facteur::Racine(bi(2)), 1)])));
    }
}
