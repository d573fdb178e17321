// src/noyau/lecture.rs
//
// Lecture décimale (conversion numérique)
// ---------------------------------------
// Arithmétique en virgule fixe sur grands entiers : x est représenté par
// ⌊x · 10^chiffres⌋. On calcule avec des chiffres de garde puis on tronque.
//
// - π (Machin), 𝑒 (série), √ (Newton)
// - exp / ln / sin / cos / tan / atan / asin / acos / puissances réelles
// - irrationnels natifs tronqués à la précision déclarée (`π6?`)
// - irrationnels personnalisés : valeur déclarée obligatoire (`x2.5?`)
//
// Aucune valeur n’est mise en cache : chaque conversion recalcule ce dont elle a besoin.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::fonctions::{Fonction, Refus};
use super::terme::{Facteur, Symbole, Valeur};

/// Chiffres de garde ajoutés à la précision demandée.
const GARDE: usize = 20;
/// Précision de l’analyse de signe numérique.
const CHIFFRES_SIGNE: usize = 40;
/// |x| sous 10^-30 : signe jugé indécidable.
const SEUIL_SIGNE: usize = 30;

/* ------------------------ Déclarations ------------------------ */

/// Déclaration d’un irrationnel personnalisé (`x+?`, `x2.5?`, `<a>-1?`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Declaration {
    pub signe: Option<i8>,
    pub valeur: Option<BigRational>,
}

/// Paramètres collectés avant l’évaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Conversions {
    pub personnalises: BTreeMap<Symbole, Declaration>,
    /// Décimales retenues pour π / 𝑒.
    pub natifs: BTreeMap<Symbole, usize>,
    /// Décimales globales (paramètre de groupe, le plus grand l’emporte).
    pub decimales: Option<usize>,
}

impl Conversions {
    pub fn valeur(&self, s: &Symbole) -> Option<&BigRational> {
        self.personnalises.get(s)?.valeur.as_ref()
    }

    /// Signe déclaré, ou signe de la valeur déclarée.
    pub fn signe(&self, s: &Symbole) -> Option<i8> {
        let d = self.personnalises.get(s)?;
        d.signe.or_else(|| {
            d.valeur.as_ref().map(|v| {
                if v.is_zero() {
                    0
                } else if v.is_negative() {
                    -1
                } else {
                    1
                }
            })
        })
    }

    /// Remplace les irrationnels personnalisés par leur valeur déclarée.
    pub fn substituer(&self, v: &Valeur) -> Valeur {
        v.substituer(&|s| self.valeur(s).cloned().map(Valeur::rationnel))
    }

    fn sans_troncature(&self) -> Conversions {
        Conversions {
            personnalises: self.personnalises.clone(),
            natifs: BTreeMap::new(),
            decimales: None,
        }
    }
}

/* ------------------------ Décimal (scaled -> texte) ------------------------ */

fn pow10(n: usize) -> BigInt {
    num_traits::pow(BigInt::from(10), n)
}

/// Convertit un entier “scalé” (×10^digits) en texte décimal tronqué.
pub fn scaled_to_decimal(mut scaled: BigInt, digits: usize) -> String {
    let neg = scaled.is_negative();
    if neg {
        scaled = -scaled;
    }

    let scale = pow10(digits);
    let int_part = &scaled / &scale;
    let frac_part = &scaled % &scale;

    let signe = if neg && !scaled.is_zero() { "-" } else { "" };
    if digits == 0 {
        return format!("{signe}{int_part}");
    }

    let mut frac = frac_part.to_str_radix(10);
    while frac.len() < digits {
        frac.insert(0, '0');
    }

    format!("{signe}{int_part}.{frac}")
}

/// r -> entier “scalé” = r * 10^digits, tronqué vers zéro.
fn rational_scaled(r: &BigRational, digits: usize) -> BigInt {
    let scale = pow10(digits);
    (r.numer() * scale) / r.denom()
}

/// ⌊a/b⌋ (b ≠ 0).
fn div_plancher(a: &BigInt, b: &BigInt) -> BigInt {
    let q = a / b;
    let r = a - &q * b;
    if !r.is_zero() && (r.is_negative() != b.is_negative()) {
        q - 1
    } else {
        q
    }
}

/* ------------------------ Virgule fixe ------------------------ */

struct Echelle {
    chiffres: usize,
    un: BigInt,
}

impl Echelle {
    fn new(chiffres: usize) -> Self {
        Self {
            chiffres,
            un: pow10(chiffres),
        }
    }

    fn rationnel(&self, r: &BigRational) -> BigInt {
        rational_scaled(r, self.chiffres)
    }

    fn mul(&self, a: &BigInt, b: &BigInt) -> BigInt {
        a * b / &self.un
    }

    fn div(&self, a: &BigInt, b: &BigInt) -> Result<BigInt, Refus> {
        if b.is_zero() {
            return Err(Refus::DivisionParZero);
        }
        Ok(a * &self.un / b)
    }

    fn moitie_pi(&self) -> BigInt {
        self.pi() >> 1
    }

    /* --- constantes --- */

    /// arctan(1/q) en entier scalé (troncature) via série :
    /// atan(z) = z - z^3/3 + z^5/5 - ...
    fn arctan_inv_q(&self, q: i64) -> BigInt {
        let q = BigInt::from(q);

        let mut k: usize = 0;
        let mut sign_pos = true;

        // q^(2k+1)
        let mut q_pow = q.clone();
        let mut sum = BigInt::zero();

        loop {
            let denom = BigInt::from(2 * k + 1);
            let d = &q_pow * &denom;

            let term = &self.un / &d;
            if term.is_zero() {
                break;
            }

            if sign_pos {
                sum += &term;
            } else {
                sum -= &term;
            }

            q_pow *= &q;
            q_pow *= &q;

            sign_pos = !sign_pos;
            k += 1;
        }

        sum
    }

    /// Machin : π = 16*atan(1/5) - 4*atan(1/239)
    fn pi(&self) -> BigInt {
        BigInt::from(16) * self.arctan_inv_q(5) - BigInt::from(4) * self.arctan_inv_q(239)
    }

    /// 𝑒 = Σ 1/k!
    fn e(&self) -> BigInt {
        let mut somme = BigInt::zero();
        let mut terme = self.un.clone();
        let mut k = 1u32;
        while !terme.is_zero() {
            somme += &terme;
            terme /= k;
            k += 1;
        }
        somme
    }

    /// Tronque x à `places` décimales (si moins que la précision courante).
    fn tronquer(&self, x: BigInt, places: usize) -> BigInt {
        if places >= self.chiffres {
            return x;
        }
        let q = pow10(self.chiffres - places);
        x / &q * q
    }

    /* --- racines / puissances --- */

    /// √a (a ≥ 0) : floor(√(a·10^chiffres)) par Newton.
    fn racine(&self, a: &BigInt) -> Result<BigInt, Refus> {
        if a.is_negative() {
            return Err(Refus::Domaine("racine carrée d’un nombre négatif".into()));
        }
        let cible = a * &self.un;
        if cible.is_zero() {
            return Ok(BigInt::zero());
        }

        // point de départ au-dessus de la racine
        let mut y = BigInt::one() << (cible.bits() / 2 + 1);
        loop {
            let y_next = (&y + &cible / &y) >> 1;
            if y_next >= y {
                break;
            }
            y = y_next;
        }
        while &y * &y > cible {
            y -= 1u32;
        }
        while (&y + 1u32) * (&y + 1u32) <= cible {
            y += 1u32;
        }
        Ok(y)
    }

    fn puissance_entiere(&self, a: &BigInt, k: i64) -> Result<BigInt, Refus> {
        if k < 0 {
            let p = self.puissance_entiere(a, -k)?;
            return self.div(&self.un, &p);
        }
        let mut e = k as u64;
        let mut acc = self.un.clone();
        let mut b = a.clone();
        while e > 0 {
            if (e & 1) == 1 {
                acc = self.mul(&acc, &b);
            }
            e >>= 1;
            if e > 0 {
                b = self.mul(&b, &b);
            }
        }
        Ok(acc)
    }

    /* --- exp / ln --- */

    fn exp(&self, x: &BigInt) -> Result<BigInt, Refus> {
        if x.is_negative() {
            let p = self.exp(&-x)?;
            return self.div(&self.un, &p);
        }
        // réduction : x / 2^n ≤ 1/8
        let huitieme = &self.un >> 3;
        let mut y = x.clone();
        let mut n = 0u32;
        while y > huitieme {
            y >>= 1;
            n += 1;
        }

        let mut somme = self.un.clone();
        let mut terme = self.un.clone();
        let mut k = 1u32;
        loop {
            terme = self.mul(&terme, &y) / k;
            if terme.is_zero() {
                break;
            }
            somme += &terme;
            k += 1;
        }

        for _ in 0..n {
            somme = self.mul(&somme, &somme);
        }
        Ok(somme)
    }

    /// atanh(z) = z + z^3/3 + z^5/5 + ... (|z| < 1)
    fn atanh(&self, z: &BigInt) -> BigInt {
        let z2 = self.mul(z, z);
        let mut puissance = z.clone();
        let mut somme = z.clone();
        let mut k = 1u32;
        loop {
            puissance = self.mul(&puissance, &z2);
            let terme = &puissance / (2 * k + 1);
            if terme.is_zero() {
                break;
            }
            somme += terme;
            k += 1;
        }
        somme
    }

    fn ln(&self, x: &BigInt) -> Result<BigInt, Refus> {
        if !x.is_positive() {
            return Err(Refus::Domaine("logarithme d’un nombre non positif".into()));
        }
        // x = m · 2^k, m ∈ (1/2, 1]
        let mut k: i64 = 0;
        let mut m = x.clone();
        while m > self.un {
            k += 1;
            m = x >> (k as usize);
        }
        let moitie = &self.un >> 1;
        while m <= moitie {
            k -= 1;
            m = x << ((-k) as usize);
        }

        let z = self.div(&(&m - &self.un), &(&m + &self.un))?;
        let ln_m = self.atanh(&z) << 1;

        let tiers = &self.un / 3;
        let ln2 = self.atanh(&tiers) << 1;
        Ok(ln_m + ln2 * k)
    }

    /* --- trigonométrie --- */

    /// Ramène x dans [-π, π].
    fn reduire_angle(&self, x: &BigInt) -> BigInt {
        let pi = self.pi();
        let deux_pi = &pi << 1;
        let tours = div_plancher(&(x + &pi), &deux_pi);
        x - tours * deux_pi
    }

    fn sin(&self, x: &BigInt) -> BigInt {
        let x = self.reduire_angle(x);
        let x2 = self.mul(&x, &x);
        let mut terme = x.clone();
        let mut somme = x;
        let mut k = 1u32;
        loop {
            terme = -self.mul(&terme, &x2) / ((2 * k) * (2 * k + 1));
            if terme.is_zero() {
                break;
            }
            somme += &terme;
            k += 1;
        }
        somme
    }

    fn cos(&self, x: &BigInt) -> BigInt {
        let x = self.reduire_angle(x);
        let x2 = self.mul(&x, &x);
        let mut terme = self.un.clone();
        let mut somme = self.un.clone();
        let mut k = 1u32;
        loop {
            terme = -self.mul(&terme, &x2) / ((2 * k - 1) * (2 * k));
            if terme.is_zero() {
                break;
            }
            somme += &terme;
            k += 1;
        }
        somme
    }

    fn atan(&self, x: &BigInt) -> Result<BigInt, Refus> {
        if x.is_negative() {
            return Ok(-self.atan(&-x)?);
        }
        if x > &self.un {
            let inverse = self.div(&self.un, x)?;
            return Ok(self.moitie_pi() - self.atan(&inverse)?);
        }
        // atan(y) = 2·atan(y / (1 + √(1 + y²))), jusqu’à y ≤ 1/5
        let cinquieme = &self.un / 5;
        let mut y = x.clone();
        let mut doublements = 0usize;
        while y > cinquieme {
            let r = self.racine(&(&self.un + self.mul(&y, &y)))?;
            y = self.div(&y, &(&self.un + r))?;
            doublements += 1;
        }

        let y2 = self.mul(&y, &y);
        let mut puissance = y.clone();
        let mut somme = y;
        let mut k = 1u32;
        let mut positif = false;
        loop {
            puissance = self.mul(&puissance, &y2);
            let terme = &puissance / (2 * k + 1);
            if terme.is_zero() {
                break;
            }
            if positif {
                somme += terme;
            } else {
                somme -= terme;
            }
            positif = !positif;
            k += 1;
        }
        Ok(somme << doublements)
    }

    fn asin(&self, x: &BigInt) -> Result<BigInt, Refus> {
        if x.abs() > self.un {
            return Err(Refus::Domaine("argument hors de [-1, 1]".into()));
        }
        if x.abs() == self.un {
            let q = self.moitie_pi();
            return Ok(if x.is_negative() { -q } else { q });
        }
        let c = self.racine(&(&self.un - self.mul(x, x)))?;
        self.atan(&self.div(x, &c)?)
    }

    /* --- valeurs exactes --- */

    fn valeur(&self, v: &Valeur, conv: &Conversions) -> Result<BigInt, Refus> {
        let mut total = BigInt::zero();
        for (m, c) in v.termes() {
            let mut produit = self.un.clone();
            for (f, e) in m.facteurs() {
                let x = self.facteur(f, conv)?;
                produit = self.mul(&produit, &self.puissance_entiere(&x, *e)?);
            }
            total += produit * c.numer() / c.denom();
        }
        Ok(total)
    }

    fn facteur(&self, f: &Facteur, conv: &Conversions) -> Result<BigInt, Refus> {
        match f {
            Facteur::Racine(n) => self.racine(&(n * &self.un)),
            Facteur::Symbole(s @ (Symbole::Pi | Symbole::E)) => {
                let x = if *s == Symbole::Pi { self.pi() } else { self.e() };
                Ok(match conv.natifs.get(s) {
                    Some(places) => self.tronquer(x, *places),
                    None => x,
                })
            }
            Facteur::Symbole(s) => conv
                .valeur(s)
                .map(|r| self.rationnel(r))
                .ok_or_else(|| Refus::Conversion(s.to_string())),
            Facteur::Groupe(v) => self.valeur(v, conv),
            Facteur::Appel(fx, args) => self.appel(*fx, args, conv),
        }
    }

    fn appel(&self, f: Fonction, args: &[Valeur], conv: &Conversions) -> Result<BigInt, Refus> {
        let xs: Vec<BigInt> = args
            .iter()
            .map(|a| self.valeur(a, conv))
            .collect::<Result<_, _>>()?;
        let hors = || Refus::Domaine(format!("{f}() sans conversion numérique"));

        match (f, xs.as_slice()) {
            (Fonction::Pow, [a, b]) => self.puissance_reelle(a, b, args.get(1)),
            (Fonction::Sqrt, [a]) => self.racine(a),
            (Fonction::Sq, [a]) => self.puissance_entiere(a, 2),
            (Fonction::Cub, [a]) => self.puissance_entiere(a, 3),
            (Fonction::Rec, [a]) => self.div(&self.un, a),
            (Fonction::Abs, [a]) => Ok(a.abs()),
            (Fonction::Sign, [a]) => Ok(a.signum() * &self.un),
            (Fonction::Mod, [a, b]) => {
                if b.is_zero() {
                    return Err(Refus::DivisionParZero);
                }
                Ok(a - div_plancher(a, b) * b)
            }
            (Fonction::Sin, [a]) => Ok(self.sin(a)),
            (Fonction::Cos, [a]) => Ok(self.cos(a)),
            (Fonction::Tan, [a]) => self.div(&self.sin(a), &self.cos(a)),
            (Fonction::Asin, [a]) => self.asin(a),
            (Fonction::Acos, [a]) => Ok(self.moitie_pi() - self.asin(a)?),
            (Fonction::Atan, [a]) => self.atan(a),
            (Fonction::Ln, [a]) => self.ln(a),
            (Fonction::Lg, [a]) => {
                let dix = &self.un * 10;
                self.div(&self.ln(a)?, &self.ln(&dix)?)
            }
            (Fonction::Log, [b, a]) => {
                let ln_b = self.ln(b)?;
                if ln_b.is_zero() {
                    return Err(Refus::Domaine("base de logarithme égale à 1".into()));
                }
                self.div(&self.ln(a)?, &ln_b)
            }
            (Fonction::Exp, [a]) => self.exp(a),
            _ => Err(hors()),
        }
    }

    /// a^b réel ; exposant rationnel exact utilisé pour le signe d’une base négative.
    fn puissance_reelle(&self, a: &BigInt, b: &BigInt, exact: Option<&Valeur>) -> Result<BigInt, Refus> {
        let rationnel = exact.and_then(Valeur::en_rationnel);
        if let Some(k) = rationnel.as_ref().filter(|r| r.is_integer()).and_then(|r| r.numer().to_i64()) {
            return self.puissance_entiere(a, k);
        }
        if a.is_zero() {
            return Ok(BigInt::zero());
        }
        if a.is_positive() {
            return self.exp(&self.mul(b, &self.ln(a)?));
        }
        // base négative : racine d’indice impair seulement
        match rationnel {
            Some(r) if (r.denom() % 2u32) == BigInt::one() => {
                let module = self.exp(&self.mul(b, &self.ln(&-a)?))?;
                let impair = (r.numer() % 2u32) != BigInt::zero();
                Ok(if impair { -module } else { module })
            }
            _ => Err(Refus::Domaine("racine paire d’un nombre négatif".into())),
        }
    }
}

/* ------------------------ API ------------------------ */

/// Texte décimal de `v` tronqué à `decimales` places.
pub fn en_decimal(v: &Valeur, conv: &Conversions, decimales: usize) -> Result<String, Refus> {
    if let Some(r) = v.en_rationnel() {
        return Ok(scaled_to_decimal(rational_scaled(&r, decimales), decimales));
    }
    let ech = Echelle::new(decimales + GARDE);
    let x = ech.valeur(v, conv)?;
    Ok(scaled_to_decimal(x / pow10(GARDE), decimales))
}

/// Signe par approximation (valeurs déclarées utilisées, précision native pleine).
/// `None` si la valeur n’est pas concrète ou trop proche de zéro.
pub fn signe_numerique(v: &Valeur, conv: &Conversions) -> Option<i8> {
    let ech = Echelle::new(CHIFFRES_SIGNE);
    let x = ech.valeur(v, &conv.sans_troncature()).ok()?;
    let seuil = pow10(CHIFFRES_SIGNE - SEUIL_SIGNE);
    if x > seuil {
        Some(1)
    } else if x < -seuil {
        Some(-1)
    } else {
        None
    }
}
