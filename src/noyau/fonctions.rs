// src/noyau/fonctions.rs
//
// Table des fonctions + règles de réduction exactes
// -------------------------------------------------
// Chaque règle reçoit des valeurs exactes et rend :
// - une valeur exacte (identité reconnue ou calcul exact)
// - un appel retenu (facteur `Appel`) quand aucune forme exacte n’existe
// - un refus (domaine, division par zéro, conversion impossible)
//
// Les opérateurs unaires et binaires réutilisent ces règles :
// `^` = pow, `%` = mod, `√` = sqrt, `!` = fact, `|x|` = abs.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::canon::{petit_entier, pgcd, ppcm, puissance_rat, racine_exacte, reste_euclidien};
use super::canon::racine_rationnelle_exacte;
use super::lecture::{signe_numerique, Conversions};
use super::terme::{Facteur, Symbole, Valeur};
use super::trig::{trig_inverse_special, trig_special, TrigFn, TrigInverse, TrigOutcome};

/// Au-delà, la puissance entière est retenue telle quelle.
pub const PUISSANCE_MAX: i64 = 10_000;
/// Exposant maximal d’un facteur après une puissance.
const EXPOSANT_MAX: i64 = 1_000_000;
/// Au-delà, une somme élevée à une puissance reste groupée.
pub const DEVELOPPEMENT_MAX: i64 = 16;
/// Indice de racine maximal tenté exactement.
const INDICE_MAX: i64 = 64;
/// Au-delà, la factorielle est retenue.
pub const FACT_MAX: i64 = 2_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fonction {
    Pow,
    Sqrt,
    Sq,
    Cub,
    Rec,
    Mod,
    Fact,
    Abs,
    Sign,
    Gcd,
    Lcm,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Log,
    Ln,
    Lg,
    Exp,
}

impl Fonction {
    pub const TOUTES: [Fonction; 21] = [
        Fonction::Pow,
        Fonction::Sqrt,
        Fonction::Sq,
        Fonction::Cub,
        Fonction::Rec,
        Fonction::Mod,
        Fonction::Fact,
        Fonction::Abs,
        Fonction::Sign,
        Fonction::Gcd,
        Fonction::Lcm,
        Fonction::Sin,
        Fonction::Cos,
        Fonction::Tan,
        Fonction::Asin,
        Fonction::Acos,
        Fonction::Atan,
        Fonction::Log,
        Fonction::Ln,
        Fonction::Lg,
        Fonction::Exp,
    ];

    pub fn nom(self) -> &'static str {
        match self {
            Fonction::Pow => "pow",
            Fonction::Sqrt => "sqrt",
            Fonction::Sq => "sq",
            Fonction::Cub => "cub",
            Fonction::Rec => "rec",
            Fonction::Mod => "mod",
            Fonction::Fact => "fact",
            Fonction::Abs => "abs",
            Fonction::Sign => "sign",
            Fonction::Gcd => "gcd",
            Fonction::Lcm => "lcm",
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Asin => "asin",
            Fonction::Acos => "acos",
            Fonction::Atan => "atan",
            Fonction::Log => "log",
            Fonction::Ln => "ln",
            Fonction::Lg => "lg",
            Fonction::Exp => "exp",
        }
    }

    pub fn depuis_nom(nom: &str) -> Option<Self> {
        Self::TOUTES.iter().copied().find(|f| f.nom() == nom)
    }

    pub fn arite(self) -> usize {
        match self {
            Fonction::Pow | Fonction::Mod | Fonction::Gcd | Fonction::Lcm | Fonction::Log => 2,
            _ => 1,
        }
    }

    /// Signe d’un appel retenu, quand il ne dépend pas de l’argument.
    pub fn signe_evident(
        self,
        _args: &[Valeur],
        _signe_symbole: &dyn Fn(&Symbole) -> Option<i8>,
    ) -> Option<i8> {
        match self {
            Fonction::Exp | Fonction::Fact => Some(1),
            _ => None,
        }
    }
}

impl fmt::Display for Fonction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nom())
    }
}

/* ------------------------ Refus ------------------------ */

/// Échec d’une règle ; l’évaluateur y rattache la plage et l’expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Refus {
    Domaine(String),
    DivisionParZero,
    Conversion(String),
}

fn domaine(raison: &str) -> Refus {
    Refus::Domaine(raison.to_string())
}

/* ------------------------ Aiguillage ------------------------ */

pub fn appliquer(f: Fonction, args: &[Valeur], conv: &Conversions) -> Result<Valeur, Refus> {
    match (f, args) {
        (Fonction::Pow, [a, b]) => puissance(a, b, conv),
        (Fonction::Sqrt, [a]) => racine(a, conv),
        (Fonction::Sq, [a]) => puissance(a, &Valeur::entier(2), conv),
        (Fonction::Cub, [a]) => puissance(a, &Valeur::entier(3), conv),
        (Fonction::Rec, [a]) => a.inverse().ok_or(Refus::DivisionParZero),
        (Fonction::Mod, [a, b]) => modulo(a, b, conv),
        (Fonction::Fact, [a]) => factorielle(a, conv),
        (Fonction::Abs, [a]) => absolu(a, conv),
        (Fonction::Sign, [a]) => signe(a, conv),
        (Fonction::Gcd | Fonction::Lcm, [a, b]) => pgcd_ppcm(f, a, b, conv),
        (Fonction::Sin, [a]) => trigonometrique(a, TrigFn::Sin, f),
        (Fonction::Cos, [a]) => trigonometrique(a, TrigFn::Cos, f),
        (Fonction::Tan, [a]) => trigonometrique(a, TrigFn::Tan, f),
        (Fonction::Asin, [a]) => reciproque(a, TrigInverse::Asin, f, conv),
        (Fonction::Acos, [a]) => reciproque(a, TrigInverse::Acos, f, conv),
        (Fonction::Atan, [a]) => reciproque(a, TrigInverse::Atan, f, conv),
        (Fonction::Log, [b, x]) => logarithme(b, x, f, conv),
        (Fonction::Ln, [x]) => logarithme(&Valeur::symbole(Symbole::E), x, f, conv),
        (Fonction::Lg, [x]) => logarithme(&Valeur::entier(10), x, f, conv),
        (Fonction::Exp, [x]) => exponentielle(x),
        _ => Err(domaine("nombre d’arguments inattendu")),
    }
}

/* ------------------------ Concret / signe ------------------------ */

/// Valeur rationnelle après substitution des valeurs déclarées.
/// Irrationnel personnalisé sans valeur => Conversion ; reste irrationnel => Domaine.
fn concret(v: &Valeur, conv: &Conversions) -> Result<BigRational, Refus> {
    let substitue = conv.substituer(v);
    if let Some(s) = substitue.symboles().into_iter().find(|s| !s.est_natif()) {
        return Err(Refus::Conversion(s.to_string()));
    }
    substitue
        .en_rationnel()
        .ok_or_else(|| domaine("argument rationnel attendu"))
}

/// Signe exact si connu : analyse des facteurs, puis valeur approchée.
pub fn signe_de(v: &Valeur, conv: &Conversions) -> Option<i8> {
    if let Some(s) = v.signe_evident(&|s| conv.signe(s)) {
        return Some(s);
    }
    signe_numerique(v, conv)
}

/* ------------------------ Puissances ------------------------ */

fn retenue(f: Fonction, args: Vec<Valeur>) -> Result<Valeur, Refus> {
    Ok(Valeur::appel(f, args))
}

pub fn puissance(base: &Valeur, exposant: &Valeur, conv: &Conversions) -> Result<Valeur, Refus> {
    let Some(e) = exposant.en_rationnel() else {
        if base.en_rationnel().is_some_and(|b| b.is_one()) {
            return Ok(Valeur::un());
        }
        return retenue(Fonction::Pow, vec![base.clone(), exposant.clone()]);
    };

    if base.est_zero() {
        return if e.is_zero() {
            Err(domaine("0^0 est indéfini"))
        } else if e.is_negative() {
            Err(Refus::DivisionParZero)
        } else {
            Ok(Valeur::zero())
        };
    }
    if let Some(b) = base.en_rationnel() {
        if b.is_one() {
            return Ok(Valeur::un());
        }
        if e.is_integer() && b == -BigRational::one() {
            let impair = (e.numer() % BigInt::from(2)) != BigInt::zero();
            return Ok(Valeur::entier(if impair { -1 } else { 1 }));
        }
    }

    if !e.is_integer() {
        return puissance_rationnelle(base, &e, conv);
    }

    let k = match petit_entier(&e) {
        Some(k) if k.abs() <= PUISSANCE_MAX => k,
        _ => return retenue(Fonction::Pow, vec![base.clone(), exposant.clone()]),
    };

    if let Some((m, _)) = base.terme_unique() {
        if m.exposant_max().saturating_mul(k.abs()) > EXPOSANT_MAX {
            return retenue(Fonction::Pow, vec![base.clone(), exposant.clone()]);
        }
        return Ok(base.puissance_entiere(k));
    }
    if k > DEVELOPPEMENT_MAX {
        return Ok(Valeur::terme(
            BigRational::one(),
            [(Facteur::Groupe(Box::new(base.clone())), k)],
        ));
    }
    Ok(base.puissance_entiere(k))
}

/// `base^(p/q)`, q > 1.
fn puissance_rationnelle(base: &Valeur, e: &BigRational, conv: &Conversions) -> Result<Valeur, Refus> {
    let p = e.numer().to_i64();
    let q = e.denom().to_i64();
    let (p, q) = match (p, q) {
        (Some(p), Some(q)) if q <= INDICE_MAX && p.abs() <= PUISSANCE_MAX => (p, q),
        _ => return Ok(racine_retenue(base, e)),
    };

    if let Some(r) = base.en_rationnel() {
        return puissance_rationnelle_de(&r, p, q).map(|v| v.unwrap_or_else(|| racine_retenue(base, e)));
    }

    // terme unique à facteurs positifs et exposants multiples de q
    if let Some((m, c)) = base.terme_unique() {
        let positifs = m.facteurs().all(|(f, _)| match f {
            Facteur::Symbole(Symbole::Pi | Symbole::E) => true,
            Facteur::Symbole(s) => conv.signe(s) == Some(1),
            _ => false,
        });
        let divisibles = m.facteurs().all(|(_, k)| k % q == 0);
        if positifs && divisibles {
            if let Some(coef) = puissance_rationnelle_de(c, p, q)? {
                let facteurs: Vec<(Facteur, i64)> =
                    m.facteurs().map(|(f, k)| (f.clone(), k / q * p)).collect();
                return Ok(&coef * &Valeur::terme(BigRational::one(), facteurs));
            }
        }
    }

    if q % 2 == 0 && signe_de(base, conv) == Some(-1) {
        return Err(domaine("racine paire d’un nombre négatif"));
    }
    Ok(racine_retenue(base, e))
}

/// r^(p/q) exact pour r rationnel ; `None` si la racine n’est pas exacte.
fn puissance_rationnelle_de(r: &BigRational, p: i64, q: i64) -> Result<Option<Valeur>, Refus> {
    if r.is_zero() {
        return if p < 0 {
            Err(Refus::DivisionParZero)
        } else {
            Ok(Some(Valeur::zero()))
        };
    }
    if r.is_negative() {
        if q % 2 == 0 {
            return Err(domaine("racine paire d’un nombre négatif"));
        }
        let signe = if p % 2 == 0 { 1 } else { -1 };
        return Ok(puissance_rationnelle_de(&-r, p, q)?.map(|v| v.echelle(&BigRational::from_integer(signe.into()))));
    }

    let q32 = u32::try_from(q).map_err(|_| domaine("indice de racine invalide"))?;
    if let Some(racine) = racine_rationnelle_exacte(r, q32) {
        return Ok(Some(Valeur::rationnel(puissance_rat(&racine, p))));
    }
    if q == 2 {
        // p impair : √(r^p)
        return Ok(Some(Valeur::racine(&puissance_rat(r, p))));
    }
    Ok(None)
}

/// Forme retenue : √(x)^p pour q = 2, sinon pow(x, p/q).
fn racine_retenue(base: &Valeur, e: &BigRational) -> Valeur {
    if e.denom() == &BigInt::from(2) {
        if let Some(p) = e.numer().to_i64() {
            return Valeur::terme(
                BigRational::one(),
                [(Facteur::Appel(Fonction::Sqrt, vec![base.clone()]), p)],
            );
        }
    }
    Valeur::appel(Fonction::Pow, vec![base.clone(), Valeur::rationnel(e.clone())])
}

pub fn racine(a: &Valeur, conv: &Conversions) -> Result<Valeur, Refus> {
    if let Some(r) = a.en_rationnel() {
        if r.is_negative() {
            return Err(domaine("racine carrée d’un nombre négatif"));
        }
        return Ok(Valeur::racine(&r));
    }
    puissance(a, &Valeur::rationnel(BigRational::new(1.into(), 2.into())), conv)
}

/* ------------------------ Fonctions concrètes ------------------------ */

pub fn modulo(a: &Valeur, b: &Valeur, conv: &Conversions) -> Result<Valeur, Refus> {
    let rb = concret(b, conv)?;
    if rb.is_zero() {
        return Err(Refus::DivisionParZero);
    }
    let ra = concret(a, conv)?;
    Ok(Valeur::rationnel(reste_euclidien(&ra, &rb)))
}

pub fn factorielle(a: &Valeur, conv: &Conversions) -> Result<Valeur, Refus> {
    let r = concret(a, conv)?;
    if !r.is_integer() || r.is_negative() {
        return Err(domaine("factorielle d’un nombre non naturel"));
    }
    let n = match petit_entier(&r) {
        Some(n) if n <= FACT_MAX => n,
        _ => return retenue(Fonction::Fact, vec![Valeur::rationnel(r)]),
    };
    let produit = (2..=n).fold(BigInt::one(), |acc, k| acc * BigInt::from(k));
    Ok(Valeur::rationnel(BigRational::from_integer(produit)))
}

pub fn absolu(a: &Valeur, conv: &Conversions) -> Result<Valeur, Refus> {
    match signe_de(a, conv) {
        Some(s) if s < 0 => Ok(-a),
        Some(_) => Ok(a.clone()),
        None => retenue(Fonction::Abs, vec![a.clone()]),
    }
}

pub fn signe(a: &Valeur, conv: &Conversions) -> Result<Valeur, Refus> {
    match signe_de(a, conv) {
        Some(s) => Ok(Valeur::entier(i64::from(s))),
        None => retenue(Fonction::Sign, vec![a.clone()]),
    }
}

fn pgcd_ppcm(f: Fonction, a: &Valeur, b: &Valeur, conv: &Conversions) -> Result<Valeur, Refus> {
    let ra = concret(a, conv)?;
    let rb = concret(b, conv)?;
    if !ra.is_integer() || !rb.is_integer() {
        return Err(domaine("arguments entiers attendus"));
    }
    let r = if f == Fonction::Gcd {
        pgcd(ra.numer(), rb.numer())
    } else {
        ppcm(ra.numer(), rb.numer())
    };
    Ok(Valeur::rationnel(BigRational::from_integer(r)))
}

/* ------------------------ Trigonométrie ------------------------ */

fn trigonometrique(a: &Valeur, t: TrigFn, f: Fonction) -> Result<Valeur, Refus> {
    match trig_special(a, t) {
        Some(TrigOutcome::Valeur(v)) => Ok(v),
        Some(TrigOutcome::Indefini) => Err(domaine("tangente non définie en π/2 + kπ")),
        None => retenue(f, vec![a.clone()]),
    }
}

fn reciproque(a: &Valeur, t: TrigInverse, f: Fonction, conv: &Conversions) -> Result<Valeur, Refus> {
    if t != TrigInverse::Atan {
        let un = Valeur::un();
        let au_dessus = signe_de(&(a - &un), conv) == Some(1);
        let en_dessous = signe_de(&(a + &un), conv) == Some(-1);
        if au_dessus || en_dessous {
            return Err(domaine("argument hors de [-1, 1]"));
        }
    }
    match trig_inverse_special(a, t) {
        Some(v) => Ok(v),
        None => retenue(f, vec![a.clone()]),
    }
}

/* ------------------------ Logarithmes / exponentielle ------------------------ */

/// Plus grand m tel que r = s^m (r > 0, r ≠ 1) : (s, m).
fn base_primitive(r: &BigRational) -> (BigRational, i64) {
    let bits = r.numer().bits().max(r.denom().bits()).min(INDICE_MAX as u64) as i64;
    for m in (2..=bits).rev() {
        let m32 = m as u32;
        if let (Some(n), Some(d)) = (racine_exacte(r.numer(), m32), racine_exacte(r.denom(), m32)) {
            return (BigRational::new(n, d), m);
        }
    }
    (r.clone(), 1)
}

/// log_b(x) rationnel exact si b et x sont des puissances rationnelles d’une même base.
fn log_exact(b: &BigRational, x: &BigRational) -> Option<BigRational> {
    let (sb, mb) = base_primitive(b);
    let (sx, mx) = base_primitive(x);
    if sb == sx {
        return Some(BigRational::new(mx.into(), mb.into()));
    }
    if sb == BigRational::one() / &sx {
        return Some(BigRational::new((-mx).into(), mb.into()));
    }
    None
}

pub fn logarithme(b: &Valeur, x: &Valeur, f: Fonction, conv: &Conversions) -> Result<Valeur, Refus> {
    if let Some(s) = signe_de(b, conv) {
        if s <= 0 {
            return Err(domaine("base de logarithme non positive"));
        }
    }
    if b.en_rationnel().is_some_and(|r| r.is_one()) {
        return Err(domaine("base de logarithme égale à 1"));
    }
    if let Some(s) = signe_de(x, conv) {
        if s <= 0 {
            return Err(domaine("logarithme d’un nombre non positif"));
        }
    }

    if x.en_rationnel().is_some_and(|r| r.is_one()) {
        return Ok(Valeur::zero());
    }
    if x == b {
        return Ok(Valeur::un());
    }

    if let (Some(rb), Some(rx)) = (b.en_rationnel(), x.en_rationnel()) {
        if let Some(k) = log_exact(&rb, &rx) {
            return Ok(Valeur::rationnel(k));
        }
    }

    // log(b, b^k) pour une base à facteur unique
    if let (Some(fb), Some((mx, cx))) = (b.facteur_seul(), x.terme_unique()) {
        if cx.is_one() && mx.nb_facteurs() == 1 {
            let k = mx.exposant(fb);
            if k != 0 {
                return Ok(Valeur::entier(k));
            }
        }
    }

    // ln(exp(y)) = y
    if let (Some(Facteur::Symbole(Symbole::E)), Some(Facteur::Appel(Fonction::Exp, args))) =
        (b.facteur_seul(), x.facteur_seul())
    {
        if let [y] = args.as_slice() {
            return Ok(y.clone());
        }
    }

    match f {
        Fonction::Log => retenue(f, vec![b.clone(), x.clone()]),
        _ => retenue(f, vec![x.clone()]),
    }
}

pub fn exponentielle(x: &Valeur) -> Result<Valeur, Refus> {
    if let Some(k) = x.en_rationnel().as_ref().and_then(petit_entier) {
        if k.abs() <= PUISSANCE_MAX {
            return Ok(Valeur::terme(
                BigRational::one(),
                [(Facteur::Symbole(Symbole::E), k)],
            ));
        }
    }
    // exp(ln(y)) = y
    if let Some(Facteur::Appel(Fonction::Ln, args)) = x.facteur_seul() {
        if let [y] = args.as_slice() {
            return Ok(y.clone());
        }
    }
    retenue(Fonction::Exp, vec![x.clone()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn q(n: i64, d: i64) -> Valeur {
        Valeur::rationnel(BigRational::new(n.into(), d.into()))
    }

    fn app(f: Fonction, args: &[Valeur]) -> Result<Valeur, Refus> {
        appliquer(f, args, &Conversions::default())
    }

    fn x() -> Valeur {
        Valeur::symbole(Symbole::Court('x'))
    }

    #[test]
    fn table_des_noms() {
        for f in Fonction::TOUTES {
            assert_eq!(Fonction::depuis_nom(f.nom()), Some(f));
        }
        assert_eq!(Fonction::depuis_nom("sinh"), None);
        assert_eq!(Fonction::Log.arite(), 2);
        assert_eq!(Fonction::Ln.arite(), 1);
    }

    #[test]
    fn puissances_exactes() {
        assert_eq!(app(Fonction::Pow, &[q(2, 1), q(10, 1)]), Ok(q(1024, 1)));
        assert_eq!(app(Fonction::Pow, &[q(2, 1), q(-2, 1)]), Ok(q(1, 4)));
        assert_eq!(app(Fonction::Pow, &[q(8, 1), q(2, 3)]), Ok(q(4, 1)));
        assert_eq!(app(Fonction::Pow, &[q(-8, 1), q(1, 3)]), Ok(q(-2, 1)));
        assert_eq!(app(Fonction::Sqrt, &[q(12, 1)]), Ok(Valeur::racine(&BigRational::from_integer(12.into()))));
        assert!(matches!(app(Fonction::Pow, &[q(0, 1), q(0, 1)]), Err(Refus::Domaine(_))));
        assert_eq!(app(Fonction::Pow, &[q(0, 1), q(-1, 1)]), Err(Refus::DivisionParZero));
        assert!(matches!(app(Fonction::Sqrt, &[q(-4, 1)]), Err(Refus::Domaine(_))));
    }

    #[test]
    fn puissance_retenue() {
        // 2^(1/3) n’a pas de forme exacte
        let v = app(Fonction::Pow, &[q(2, 1), q(1, 3)]).unwrap();
        assert_eq!(v, Valeur::appel(Fonction::Pow, vec![q(2, 1), q(1, 3)]));
        let s = app(Fonction::Sqrt, &[&x() + &Valeur::un()]).unwrap();
        assert_eq!(s, Valeur::appel(Fonction::Sqrt, vec![&x() + &Valeur::un()]));
    }

    #[test]
    fn fonctions_concretes() {
        assert_eq!(app(Fonction::Mod, &[q(7, 1), q(3, 1)]), Ok(q(1, 1)));
        assert_eq!(app(Fonction::Mod, &[q(-7, 1), q(3, 1)]), Ok(q(2, 1)));
        assert_eq!(app(Fonction::Mod, &[q(7, 1), q(0, 1)]), Err(Refus::DivisionParZero));
        assert_eq!(app(Fonction::Fact, &[q(5, 1)]), Ok(q(120, 1)));
        assert!(matches!(app(Fonction::Fact, &[q(1, 2)]), Err(Refus::Domaine(_))));
        assert_eq!(app(Fonction::Gcd, &[q(12, 1), q(18, 1)]), Ok(q(6, 1)));
        assert_eq!(app(Fonction::Lcm, &[q(4, 1), q(6, 1)]), Ok(q(12, 1)));
        assert_eq!(
            app(Fonction::Fact, &[x()]),
            Err(Refus::Conversion("x".into()))
        );
        assert!(matches!(
            app(Fonction::Gcd, &[Valeur::symbole(Symbole::Pi), q(2, 1)]),
            Err(Refus::Domaine(_))
        ));
    }

    #[test]
    fn valeur_absolue_et_signe() {
        let pi = Valeur::symbole(Symbole::Pi);
        assert_eq!(app(Fonction::Abs, &[-&pi]), Ok(pi.clone()));
        assert_eq!(app(Fonction::Sign, &[q(-3, 2)]), Ok(q(-1, 1)));
        // π − 3 > 0 par approximation numérique
        assert_eq!(app(Fonction::Sign, &[&pi - &q(3, 1)]), Ok(q(1, 1)));
        assert_eq!(app(Fonction::Abs, &[x()]), Ok(Valeur::appel(Fonction::Abs, vec![x()])));
    }

    #[test]
    fn trigonometrie() {
        let pi_6 = Valeur::symbole(Symbole::Pi).echelle(&BigRational::new(1.into(), 6.into()));
        assert_eq!(app(Fonction::Sin, &[pi_6]), Ok(q(1, 2)));
        let pi_2 = Valeur::symbole(Symbole::Pi).echelle(&BigRational::new(1.into(), 2.into()));
        assert!(matches!(app(Fonction::Tan, &[pi_2]), Err(Refus::Domaine(_))));
        assert!(matches!(app(Fonction::Asin, &[q(2, 1)]), Err(Refus::Domaine(_))));
        assert_eq!(app(Fonction::Sin, &[q(1, 1)]), Ok(Valeur::appel(Fonction::Sin, vec![q(1, 1)])));
    }

    #[test]
    fn logarithmes() {
        assert_eq!(app(Fonction::Log, &[q(2, 1), q(8, 1)]), Ok(q(3, 1)));
        assert_eq!(app(Fonction::Log, &[q(4, 1), q(8, 1)]), Ok(q(3, 2)));
        assert_eq!(app(Fonction::Log, &[q(2, 1), q(1, 8)]), Ok(q(-3, 1)));
        assert_eq!(app(Fonction::Lg, &[q(1000, 1)]), Ok(q(3, 1)));
        let e3 = Valeur::symbole(Symbole::E).puissance_entiere(3);
        assert_eq!(app(Fonction::Ln, &[e3]), Ok(q(3, 1)));
        assert!(matches!(app(Fonction::Log, &[q(1, 1), q(5, 1)]), Err(Refus::Domaine(_))));
        assert!(matches!(app(Fonction::Ln, &[q(-1, 1)]), Err(Refus::Domaine(_))));
        assert_eq!(app(Fonction::Ln, &[q(2, 1)]), Ok(Valeur::appel(Fonction::Ln, vec![q(2, 1)])));
    }

    #[test]
    fn exponentielle_entiere() {
        let e2 = Valeur::symbole(Symbole::E).puissance_entiere(2);
        assert_eq!(app(Fonction::Exp, &[q(2, 1)]), Ok(e2));
        assert_eq!(app(Fonction::Exp, &[q(0, 1)]), Ok(q(1, 1)));
        let ln2 = Valeur::appel(Fonction::Ln, vec![q(2, 1)]);
        assert_eq!(app(Fonction::Exp, &[ln2]), Ok(q(2, 1)));
    }
}
