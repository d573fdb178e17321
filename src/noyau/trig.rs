// src/noyau/trig.rs
//
// Trig spéciale (angles “exactement reconnus”) pour sin/cos/tan
// -----------------------------------------------------------
// - Extraction coeff·π via Valeur::multiple_de_pi()
// - Réduction modulo période (sin/cos : 2 ; tan : 1)
// - Table angles spéciaux sur n ∈ {1,2,3,4,6}
// - Valeurs spéciales réciproques (asin/acos/atan)

use log::trace;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive};

use super::canon::reste_euclidien;
use super::terme::{Symbole, Valeur};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrigOutcome {
    Valeur(Valeur),
    Indefini,
}

fn rat(a: i64, b: i64) -> BigRational {
    BigRational::new(BigInt::from(a), BigInt::from(b))
}

fn q(a: i64, b: i64) -> Valeur {
    Valeur::rationnel(rat(a, b))
}

/// a·√n/b
fn racine_sur(a: i64, n: i64, b: i64) -> Valeur {
    Valeur::racine(&rat(n, 1)).echelle(&rat(a, b))
}

/// k·π/n
fn angle(k: i64, n: i64) -> Valeur {
    Valeur::symbole(Symbole::Pi).echelle(&rat(k, n))
}

/// Reconnaît les angles spéciaux lorsque l’entrée est un multiple rationnel de π.
///
/// Retour :
/// - Some(Valeur(exact)) si reconnu
/// - Some(Indefini) pour tan(π/2), tan(3π/2)
/// - None si non reconnu
pub fn trig_special(x: &Valeur, f: TrigFn) -> Option<TrigOutcome> {
    // 1) extraire coeff·π
    let coeff = x.multiple_de_pi()?;

    // 2) réduire modulo 2 (tables codées sur [0,2π))
    let coeff_reduit = reste_euclidien(&coeff, &rat(2, 1));

    // 3) convertir en k/n "petit"
    let (k, n) = rational_to_small_kn(&coeff_reduit)?;
    let k_mod = k.rem_euclid(2 * n);

    let a = (k_mod, n);
    let out = match f {
        TrigFn::Sin => match a {
            (0, _) | (1, 1) => q(0, 1),
            (1, 6) | (5, 6) => q(1, 2),
            (7, 6) | (11, 6) => q(-1, 2),
            (1, 4) | (3, 4) => racine_sur(1, 2, 2),
            (5, 4) | (7, 4) => racine_sur(-1, 2, 2),
            (1, 3) | (2, 3) => racine_sur(1, 3, 2),
            (4, 3) | (5, 3) => racine_sur(-1, 3, 2),
            (1, 2) => q(1, 1),
            (3, 2) => q(-1, 1),
            _ => return None,
        },

        TrigFn::Cos => match a {
            (0, _) => q(1, 1),
            (1, 1) => q(-1, 1),
            (1, 6) | (11, 6) => racine_sur(1, 3, 2),
            (5, 6) | (7, 6) => racine_sur(-1, 3, 2),
            (1, 4) | (7, 4) => racine_sur(1, 2, 2),
            (3, 4) | (5, 4) => racine_sur(-1, 2, 2),
            (1, 3) | (5, 3) => q(1, 2),
            (2, 3) | (4, 3) => q(-1, 2),
            (1, 2) | (3, 2) => q(0, 1),
            _ => return None,
        },

        TrigFn::Tan => match a {
            (0, _) | (1, 1) => q(0, 1),
            (1, 6) | (7, 6) => racine_sur(1, 3, 3),
            (5, 6) | (11, 6) => racine_sur(-1, 3, 3),
            (1, 4) | (5, 4) => q(1, 1),
            (3, 4) | (7, 4) => q(-1, 1),
            (1, 3) | (4, 3) => racine_sur(1, 3, 1),
            (2, 3) | (5, 3) => racine_sur(-1, 3, 1),
            (1, 2) | (3, 2) => {
                trace!("{f:?}({}) = indéfini", format_angle_kn_pi(k_mod, n));
                return Some(TrigOutcome::Indefini);
            }
            _ => return None,
        },
    };

    trace!("{f:?}({}) reconnu", format_angle_kn_pi(k_mod, n));
    Some(TrigOutcome::Valeur(out))
}

/// Réciproques reconnues : asin/atan sur la table, acos = π/2 − asin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigInverse {
    Asin,
    Acos,
    Atan,
}

pub fn trig_inverse_special(x: &Valeur, f: TrigInverse) -> Option<Valeur> {
    let table: Vec<(Valeur, Valeur)> = match f {
        TrigInverse::Asin | TrigInverse::Acos => vec![
            (q(0, 1), angle(0, 1)),
            (q(1, 2), angle(1, 6)),
            (racine_sur(1, 2, 2), angle(1, 4)),
            (racine_sur(1, 3, 2), angle(1, 3)),
            (q(1, 1), angle(1, 2)),
        ],
        TrigInverse::Atan => vec![
            (q(0, 1), angle(0, 1)),
            (racine_sur(1, 3, 3), angle(1, 6)),
            (q(1, 1), angle(1, 4)),
            (racine_sur(1, 3, 1), angle(1, 3)),
        ],
    };

    // fonctions impaires : on cherche aussi −x
    let oppose = -x;
    let asin_ou_atan = table.iter().find_map(|(v, a)| {
        if v == x {
            Some(a.clone())
        } else if *v == oppose {
            Some(-a)
        } else {
            None
        }
    })?;

    Some(match f {
        TrigInverse::Acos => &angle(1, 2) - &asin_ou_atan,
        _ => asin_ou_atan,
    })
}

/* ------------------------ Outils ------------------------ */

fn format_angle_kn_pi(k: i64, n: i64) -> String {
    if k == 0 {
        return "0".to_string();
    }
    if n == 1 {
        return match k {
            1 => "π".to_string(),
            _ => format!("{k}π"),
        };
    }
    if k == 1 {
        return format!("π/{n}");
    }
    format!("{k}π/{n}")
}

/// Convertit un rationnel en (k,n) i64 réduit.
/// Accepte seulement n ∈ {1,2,3,4,6}.
fn rational_to_small_kn(r: &BigRational) -> Option<(i64, i64)> {
    let denom = r.denom().to_i64()?;
    let numer = r.numer().to_i64()?;

    if numer == 0 {
        return Some((0, 1));
    }
    let g = gcd_i64(numer.abs(), denom.abs());
    let k = numer / g;
    let n = denom / g;

    if [1, 2, 3, 4, 6].contains(&n) && !r.is_negative() {
        Some((k, n))
    } else {
        None
    }
}

fn gcd_i64(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}
